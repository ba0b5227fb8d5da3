//! Contract schemas parsed from JSON definitions.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{AbiError, AbiResult};
use crate::method::{AbiMethod, AbiVariable, Argument, Selector, SELECTOR_SIZE};
use crate::types::AbiType;
use crate::value::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EntryKind {
    Function,
    Variable,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: EntryKind,
    name: String,
    #[serde(default)]
    inputs: Vec<RawArgument>,
}

#[derive(Debug, Deserialize)]
struct RawArgument {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

impl RawEntry {
    fn arguments(&self) -> AbiResult<Vec<Argument>> {
        self.inputs
            .iter()
            .map(|raw| Ok(Argument::new(raw.name.clone(), AbiType::parse(&raw.ty)?)))
            .collect()
    }
}

/// Methods and variables of one contract.
#[derive(Debug, Clone, Default)]
pub struct AbiSchema {
    methods: Vec<AbiMethod>,
    variables: Vec<AbiVariable>,
    by_selector: HashMap<Selector, usize>,
    by_name: HashMap<String, usize>,
}

impl AbiSchema {
    /// Parses a JSON array of `{"type", "name", "inputs"}` entries.
    ///
    /// # Errors
    ///
    /// `InvalidSchema` for malformed JSON, duplicate names or two methods
    /// sharing a selector; `InvalidType` for unknown argument types.
    pub fn from_json(json: &str) -> AbiResult<Self> {
        let entries: Vec<RawEntry> =
            serde_json::from_str(json).map_err(|err| AbiError::invalid_schema(err.to_string()))?;

        let mut schema = AbiSchema::default();
        for entry in entries {
            let inputs = entry.arguments()?;
            match entry.kind {
                EntryKind::Function => schema.add_method(AbiMethod::new(entry.name, inputs))?,
                EntryKind::Variable => schema.add_variable(AbiVariable::new(entry.name, inputs))?,
            }
        }
        Ok(schema)
    }

    fn add_method(&mut self, method: AbiMethod) -> AbiResult<()> {
        if self.by_name.contains_key(&method.name) {
            return Err(AbiError::invalid_schema(format!(
                "duplicate method {}",
                method.name
            )));
        }
        if let Some(existing) = self.by_selector.get(&method.selector()) {
            return Err(AbiError::invalid_schema(format!(
                "selector {} of {} collides with {}",
                hex::encode(method.selector()),
                method.signature(),
                self.methods[*existing].signature()
            )));
        }
        let index = self.methods.len();
        self.by_selector.insert(method.selector(), index);
        self.by_name.insert(method.name.clone(), index);
        self.methods.push(method);
        Ok(())
    }

    fn add_variable(&mut self, variable: AbiVariable) -> AbiResult<()> {
        if self.variables.iter().any(|v| v.name == variable.name) {
            return Err(AbiError::invalid_schema(format!(
                "duplicate variable {}",
                variable.name
            )));
        }
        self.variables.push(variable);
        Ok(())
    }

    pub fn methods(&self) -> &[AbiMethod] {
        &self.methods
    }

    pub fn variables(&self) -> &[AbiVariable] {
        &self.variables
    }

    pub fn method_by_id(&self, selector: &[u8]) -> Option<&AbiMethod> {
        let selector: Selector = selector.try_into().ok()?;
        self.by_selector
            .get(&selector)
            .map(|index| &self.methods[*index])
    }

    pub fn method_by_name(&self, name: &str) -> Option<&AbiMethod> {
        self.by_name.get(name).map(|index| &self.methods[*index])
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&AbiVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Selector plus encoded arguments for method `name`.
    pub fn pack_method(&self, name: &str, args: &[Value]) -> AbiResult<Vec<u8>> {
        self.method_by_name(name)
            .ok_or_else(|| AbiError::MethodNotFound(name.to_string()))?
            .pack(args)
    }

    /// Decodes the arguments of a call that must target method `name`.
    pub fn unpack_method(&self, name: &str, input: &[u8]) -> AbiResult<Vec<Value>> {
        if input.len() <= SELECTOR_SIZE {
            return Err(AbiError::EmptyInput);
        }
        let method = self.locate(name, input)?;
        method.unpack_args(&input[SELECTOR_SIZE..])
    }

    /// Checks that `input` is exactly the selector of argument-less method `name`.
    pub fn unpack_empty_method(&self, name: &str, input: &[u8]) -> AbiResult<()> {
        if input.len() < SELECTOR_SIZE {
            return Err(AbiError::EmptyInput);
        }
        if input.len() > SELECTOR_SIZE {
            return Err(AbiError::InputTooLong);
        }
        self.locate(name, input).map(|_| ())
    }

    pub fn pack_variable(&self, name: &str, values: &[Value]) -> AbiResult<Vec<u8>> {
        self.variable_by_name(name)
            .ok_or_else(|| AbiError::VariableNotFound(name.to_string()))?
            .pack(values)
    }

    pub fn unpack_variable(&self, name: &str, data: &[u8]) -> AbiResult<Vec<Value>> {
        self.variable_by_name(name)
            .ok_or_else(|| AbiError::VariableNotFound(name.to_string()))?
            .unpack(data)
    }

    fn locate(&self, name: &str, input: &[u8]) -> AbiResult<&AbiMethod> {
        match self.method_by_id(&input[..SELECTOR_SIZE]) {
            Some(method) if method.name == name => Ok(method),
            _ => Err(AbiError::CouldNotLocateMethod(name.to_string())),
        }
    }
}
