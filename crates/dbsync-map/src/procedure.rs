//! Stored procedure signatures

use crate::entity::qualified_name;
use crate::types::JdbcType;
use serde::{Deserialize, Serialize};

/// Direction of a procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterDirection {
	#[default]
	In,
	Out,
	InOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureParameter {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub direction: Option<ParameterDirection>,
	pub jdbc_type: JdbcType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_length: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scale: Option<u32>,
}

impl ProcedureParameter {
	pub fn new(name: impl Into<String>, jdbc_type: JdbcType) -> Self {
		Self {
			name: name.into(),
			direction: None,
			jdbc_type,
			max_length: None,
			scale: None,
		}
	}
}

/// A stored procedure and its call parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub catalog: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub schema: Option<String>,
	/// The procedure returns a value through its first parameter
	#[serde(default)]
	pub returning_value: bool,
	#[serde(default)]
	pub parameters: Vec<ProcedureParameter>,
}

impl Procedure {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			catalog: None,
			schema: None,
			returning_value: false,
			parameters: Vec::new(),
		}
	}

	pub fn fully_qualified_name(&self) -> String {
		qualified_name(self.catalog.as_deref(), self.schema.as_deref(), &self.name)
	}

	pub fn add_parameter(&mut self, parameter: ProcedureParameter) {
		self.parameters.push(parameter);
	}
}
