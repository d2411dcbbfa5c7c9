use stubble_types::{declared_type_of, Type, Value};

use crate::{ReflectionError, Reflector};

/// Argument values prepared for matching and binding.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedArguments {
    /// One type per argument, used for matching.
    pub types: Vec<Type>,
    /// The values to bind. Positions given as type tokens hold `Null`.
    pub values: Vec<Value>,
}

impl Reflector<'_> {
    /// Derive the type of each argument from its value.
    ///
    /// A `Value::Class` argument supplies the type of its position directly and is passed as
    /// `Null`. Other values contribute their dynamic class, seen through generated proxies. `Null`
    /// carries no type and is rejected.
    pub fn argument_types_from_values(
        &self,
        args: &[Value],
    ) -> Result<AdaptedArguments, ReflectionError> {
        let mut types = Vec::with_capacity(args.len());
        let mut values = Vec::with_capacity(args.len());

        for (index, arg) in args.iter().enumerate() {
            match arg {
                Value::Class(ty) => {
                    types.push(ty.clone());
                    values.push(Value::Null);
                }
                other => {
                    let class = other
                        .runtime_class(self.env)
                        .ok_or(ReflectionError::NullArgument { index })?;
                    types.push(Type::class(declared_type_of(self.env, class)));
                    values.push(other.clone());
                }
            }
        }

        Ok(AdaptedArguments { types, values })
    }
}

/// `first` followed by `args`, for members declaring the context parameter.
pub fn arguments_with_extra_first_value(args: &[Value], first: Value) -> Vec<Value> {
    let mut out = Vec::with_capacity(args.len() + 1);
    out.push(first);
    out.extend_from_slice(args);
    out
}
