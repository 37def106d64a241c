//! Param set — named, directional bind variables.

use crate::driver::{BindArg, LobKind};
use crate::logging::PARAMS_TARGET;
use crate::sql::replace_token;
use crate::variant::Variant;
use std::fmt;

/// Bind direction of a param.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamDirection {
    #[default]
    In,
    Out,
    InOut,
}

impl fmt::Display for ParamDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamDirection::In => "IN",
            ParamDirection::Out => "OUT",
            ParamDirection::InOut => "INOUT",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub direction: ParamDirection,
    /// Scalar value; for OUT params the caller's typed seed, later the output.
    pub value: Variant,
    /// Per-index values used by batch execution.
    pub values: Vec<Variant>,
    pub lob: Option<LobKind>,
}

impl Param {
    pub fn new(name: impl Into<String>, direction: ParamDirection, value: Variant) -> Self {
        Self {
            name: name.into(),
            direction,
            value,
            values: Vec::new(),
            lob: None,
        }
    }

    pub fn token(&self) -> String {
        format!(":{}", self.name)
    }

    /// Value at a batch index, falling back to the scalar value.
    pub fn value_at(&self, index: usize) -> &Variant {
        self.values.get(index).unwrap_or(&self.value)
    }

    /// Sets the value at a batch index, padding earlier slots with null.
    pub fn set_value_at(&mut self, index: usize, value: impl Into<Variant>) {
        if self.values.len() <= index {
            self.values.resize(index + 1, Variant::Null);
        }
        self.values[index] = value.into();
    }

    pub fn bind_arg(&self) -> BindArg {
        self.make_arg(self.value.clone())
    }

    pub fn bind_arg_at(&self, index: usize) -> BindArg {
        self.make_arg(self.value_at(index).clone())
    }

    fn make_arg(&self, value: Variant) -> BindArg {
        BindArg {
            name: self.name.clone(),
            direction: self.direction,
            value,
            lob: self.lob,
        }
    }
}

/// Named output destination for [`Params::set_output_param_slice`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParamOut {
    pub name: String,
    pub value: Variant,
}

impl ParamOut {
    pub fn new(name: impl Into<String>, value: impl Into<Variant>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Params in registration order. Names are matched exactly.
#[derive(Debug, Clone, Default)]
pub struct Params {
    list: Vec<Param>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    fn upsert(&mut self, name: &str, direction: ParamDirection, value: Variant) -> &mut Param {
        let pos = match self.list.iter().position(|p| p.name == name) {
            Some(pos) => {
                let param = &mut self.list[pos];
                param.direction = direction;
                param.value = value;
                param.lob = None;
                pos
            }
            None => {
                self.list.push(Param::new(name, direction, value));
                self.list.len() - 1
            }
        };
        &mut self.list[pos]
    }

    pub fn set_input_param(&mut self, name: &str, value: impl Into<Variant>) -> &mut Param {
        self.upsert(name, ParamDirection::In, value.into())
    }

    /// Registers an OUT param; `value` is a typed seed for the output.
    pub fn set_output_param(&mut self, name: &str, value: impl Into<Variant>) -> &mut Param {
        self.upsert(name, ParamDirection::Out, value.into())
    }

    pub fn set_input_output_param(&mut self, name: &str, value: impl Into<Variant>) -> &mut Param {
        self.upsert(name, ParamDirection::InOut, value.into())
    }

    pub fn set_input_param_clob(&mut self, name: &str, value: impl Into<String>) -> &mut Param {
        let param = self.upsert(name, ParamDirection::In, Variant::Text(value.into()));
        param.lob = Some(LobKind::Clob);
        param
    }

    pub fn set_input_param_blob(&mut self, name: &str, value: impl Into<Vec<u8>>) -> &mut Param {
        let param = self.upsert(name, ParamDirection::In, Variant::Bytes(value.into()));
        param.lob = Some(LobKind::Blob);
        param
    }

    pub fn set_output_param_slice(&mut self, params: impl IntoIterator<Item = ParamOut>) {
        for p in params {
            self.upsert(&p.name, ParamDirection::Out, p.value);
        }
    }

    /// Sets the per-index values of an IN param used by batch execution.
    pub fn set_input_param_batch<T: Into<Variant>>(
        &mut self,
        name: &str,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Param {
        let pos = match self.list.iter().position(|p| p.name == name) {
            Some(pos) => pos,
            None => {
                self.list
                    .push(Param::new(name, ParamDirection::In, Variant::Null));
                self.list.len() - 1
            }
        };
        let param = &mut self.list[pos];
        param.values = values.into_iter().map(Into::into).collect();
        param
    }

    pub fn param_by_name(&self, name: &str) -> Option<&Param> {
        self.list.iter().find(|p| p.name == name)
    }

    pub fn param_by_name_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.list.iter_mut().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.param_by_name(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.list.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Longest per-index value list across params.
    pub fn batch_size(&self) -> usize {
        self.list.iter().map(|p| p.values.len()).max().unwrap_or(0)
    }

    pub fn bind_args(&self) -> Vec<BindArg> {
        self.list.iter().map(Param::bind_arg).collect()
    }

    pub fn bind_args_at(&self, index: usize) -> Vec<BindArg> {
        self.list.iter().map(|p| p.bind_arg_at(index)).collect()
    }

    /// Appends names not yet registered as empty-valued IN params.
    /// Returns how many were added.
    pub fn append_discovered<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                self.list.push(Param::new(
                    name,
                    ParamDirection::In,
                    Variant::Text(String::new()),
                ));
                added += 1;
            }
        }
        added
    }

    /// Writes driver-reported output values into OUT/INOUT params.
    pub fn apply_outputs(&mut self, outputs: &[(String, Variant)]) {
        for (name, value) in outputs {
            if let Some(param) = self.param_by_name_mut(name)
                && param.direction != ParamDirection::In
            {
                param.value = value.clone();
            }
        }
    }

    /// Replaces every param token in `sql` with the param's SQL literal.
    pub fn render_literals(&self, sql: &str) -> String {
        self.list.iter().fold(sql.to_string(), |acc, p| {
            replace_token(&acc, &p.token(), &p.value.to_sql_literal())
        })
    }

    /// Emits one event per param.
    pub fn log(&self, verbose: bool) {
        for p in &self.list {
            if verbose {
                tracing::info!(target: PARAMS_TARGET, name = %p.name, direction = %p.direction, value = ?p.value, "param");
            } else {
                tracing::trace!(target: PARAMS_TARGET, name = %p.name, direction = %p.direction, value = ?p.value, "param");
            }
        }
    }
}
