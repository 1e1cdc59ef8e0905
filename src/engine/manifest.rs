//! On-disk unit manifest format
//!
//! Unit definitions are JSON manifests: compiled unit files (`.unit`) and
//! source unit files (`.src`) share this shape and differ only in which one
//! the source precedence prefers. Packaged binaries embed an array of the
//! same manifests.

use crate::error::{Error, Result};
use crate::ir::{IrForm, Method, MethodRef, ProgramUnit, Statement, StatementKind, UnitProvenance};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitManifest {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default)]
    pub body: Vec<StatementManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StatementManifest {
    Assign {
        target: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
    },
    Invoke {
        /// Call target as a `unit#method` reference
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
    },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
    },
}

impl UnitManifest {
    /// Build a loaded unit out of this manifest. `origin` names the artifact
    /// the manifest came from and is only used for error reporting.
    pub fn to_unit(&self, provenance: UnitProvenance, origin: &str) -> Result<ProgramUnit> {
        let mut methods = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            let mut body = Vec::with_capacity(method.body.len());
            for (index, statement) in method.body.iter().enumerate() {
                let (kind, line) = match statement {
                    StatementManifest::Assign {
                        target,
                        value,
                        line,
                    } => (
                        StatementKind::Assign {
                            target: target.clone(),
                            version: None,
                            value: value.clone(),
                        },
                        *line,
                    ),
                    StatementManifest::Invoke { target, line } => {
                        let target = MethodRef::parse(target).ok_or_else(|| {
                            Error::resolution(
                                origin,
                                format!("malformed call target `{target}` in {}", method.name),
                            )
                        })?;
                        (StatementKind::Invoke { target }, *line)
                    }
                    StatementManifest::Return { line } => (StatementKind::Return, *line),
                };
                body.push(Statement {
                    index: index as u32,
                    kind,
                    line,
                });
            }
            methods.push(Method {
                name: method.name.clone(),
                line: method.line,
                body,
            });
        }
        Ok(ProgramUnit {
            name: self.name.clone(),
            provenance,
            // Bodies stay in the parsed encoding until the pipeline runs.
            form: IrForm::ThreeAddress,
            methods,
        })
    }
}
