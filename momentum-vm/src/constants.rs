//! Protocol constants of the execution engine.

use momentum_primitives::ONE_COIN;

/// Base plasma of any user block.
pub const ACCOUNT_BLOCK_BASE_PLASMA: u64 = 21_000;
/// Plasma charged per payload byte of a send to a non-embedded address.
pub const AB_BYTE_DATA_PLASMA: u64 = 68;
/// Maximum payload length of an account block.
pub const MAX_DATA_LENGTH: usize = 16_384;
/// Upper bound on the plasma of a single block.
pub const MAX_PLASMA_FOR_ACCOUNT_BLOCK: u64 =
    ACCOUNT_BLOCK_BASE_PLASMA + AB_BYTE_DATA_PLASMA * MAX_DATA_LENGTH as u64;

/// Difficulty units per unit of plasma.
pub const POW_DIFFICULTY_PER_PLASMA: u64 = 1_500;

pub const EMBEDDED_SIMPLE_PLASMA: u64 = ACCOUNT_BLOCK_BASE_PLASMA * 5 / 2;
pub const EMBEDDED_WITHDRAW_PLASMA: u64 = ACCOUNT_BLOCK_BASE_PLASMA * 7 / 2;
pub const EMBEDDED_DOUBLE_WITHDRAW_PLASMA: u64 = ACCOUNT_BLOCK_BASE_PLASMA * 9 / 2;

/// QSR (in base units) locked per fusion unit.
pub const COST_PER_FUSION_UNIT: u64 = ONE_COIN;
/// Plasma granted per fusion unit.
pub const PLASMA_PER_FUSION_UNIT: u64 = 2_100;
pub const MAX_FUSION_UNITS_PER_ACCOUNT: u64 = 5_000;
pub const MAX_FUSION_PLASMA_FOR_ACCOUNT: u64 = MAX_FUSION_UNITS_PER_ACCOUNT * PLASMA_PER_FUSION_UNIT;

/// Smallest QSR amount accepted by `Fuse`.
pub const FUSE_MIN_AMOUNT: u64 = 10 * ONE_COIN;
/// Momentums a fusion stays locked before it can be cancelled.
pub const FUSE_EXPIRATION_HEIGHT: u64 = 10;

/// ZNN burnt by `IssueToken`.
pub const TOKEN_ISSUE_FEE: u64 = ONE_COIN;
pub const TOKEN_NAME_MAX_LENGTH: usize = 40;
pub const TOKEN_SYMBOL_MAX_LENGTH: usize = 10;
pub const TOKEN_DOMAIN_MAX_LENGTH: usize = 128;
pub const TOKEN_MAX_DECIMALS: u64 = 18;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_costs() {
        assert_eq!(EMBEDDED_SIMPLE_PLASMA, 52_500);
        assert_eq!(EMBEDDED_WITHDRAW_PLASMA, 73_500);
        assert_eq!(EMBEDDED_DOUBLE_WITHDRAW_PLASMA, 94_500);
    }

    #[test]
    fn test_ceilings_fit_largest_payload() {
        assert_eq!(MAX_PLASMA_FOR_ACCOUNT_BLOCK, 1_135_112);
        assert_eq!(MAX_FUSION_PLASMA_FOR_ACCOUNT, 10_500_000);
    }
}
