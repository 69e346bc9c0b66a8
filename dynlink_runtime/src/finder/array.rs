//! Finder for array-shaped receivers

use crate::array::{element_getter, element_setter, ElementType};
use crate::convert::to_index;
use crate::error::{LinkError, ResolutionError, ResolutionResult};
use crate::finder::MethodFinder;
use crate::helpers::array_arg;
use crate::lookup::{Lookup, PrimitiveOwner};
use crate::registry::{array_operation, OperationDescriptor, ResolutionRule};
use crate::signature::{Kind, Signature};
use crate::target::{RawOperation, ResolutionTarget};
use crate::value::{ReceiverShape, RuntimeType, Value};

/// Resolves registry operations against one array receiver type
#[derive(Debug)]
pub struct ArrayMethodFinder<'a> {
    signature: &'a Signature,
    receiver_type: &'a RuntimeType,
    arity: usize,
    name: &'a str,
    lookup: &'a Lookup,
}

impl<'a> ArrayMethodFinder<'a> {
    /// `args` is the full argument list, receiver included.
    pub fn new(
        signature: &'a Signature,
        receiver_type: &'a RuntimeType,
        args: &'a [Value],
        name: &'a str,
        lookup: &'a Lookup,
    ) -> Self {
        ArrayMethodFinder {
            signature,
            receiver_type,
            arity: args.len().saturating_sub(1),
            name,
            lookup,
        }
    }

    /// Declared arity: arguments after the receiver
    pub fn arity(&self) -> usize {
        self.arity
    }

    fn check_arity(&self, descriptor: &OperationDescriptor) -> ResolutionResult<()> {
        if self.arity != descriptor.arity {
            return Err(ResolutionError::arity_mismatch(
                self.name,
                ReceiverShape::Array.noun(),
                descriptor.arity,
                self.arity,
            ));
        }
        Ok(())
    }

    fn failure(&self, cause: LinkError) -> ResolutionError {
        ResolutionError::failure(self.name, cause)
    }

    fn find_static(
        &self,
        owner: PrimitiveOwner,
        name: &str,
        signature: Signature,
    ) -> ResolutionResult<RawOperation> {
        self.lookup
            .find_static(owner, name, &signature)
            .map_err(|cause| self.failure(cause))
    }

    fn resolve(&self) -> ResolutionResult<RawOperation> {
        let descriptor = array_operation(self.name)
            .ok_or_else(|| ResolutionError::unsupported(self.name, ReceiverShape::Array.noun()))?;
        self.check_arity(descriptor)?;

        let element_type = self.receiver_type.element_type().ok_or_else(|| {
            self.failure(LinkError::NotArrayShaped(self.receiver_type.to_string()))
        })?;
        let unary = |ret: Kind| Signature::new(vec![Kind::Array], ret);

        match descriptor.rule {
            ResolutionRule::ElementGet => Ok(element_get(element_type)),
            ResolutionRule::ElementSet => Ok(element_set(element_type)),
            ResolutionRule::Length => {
                self.find_static(PrimitiveOwner::Reflect, "getLength", unary(Kind::I64))
            }
            ResolutionRule::Iterator => self
                .lookup
                .find_constructor(PrimitiveOwner::ArrayIterator, &unary(Kind::Iterator))
                .map_err(|cause| self.failure(cause)),
            ResolutionRule::Render => {
                self.find_static(PrimitiveOwner::Arrays, "toString", unary(Kind::Str))
            }
            ResolutionRule::ListView => {
                self.find_static(PrimitiveOwner::Arrays, "asList", unary(Kind::List))
            }
            ResolutionRule::Equals => self.find_static(
                PrimitiveOwner::Arrays,
                "equals",
                Signature::new(vec![Kind::Array, Kind::Array], Kind::Bool),
            ),
            ResolutionRule::ClassConstant => Ok(RawOperation::constant(
                "getClass",
                Kind::Type,
                Value::Type(self.receiver_type.clone()),
            )
            .drop_arguments(0, &[Kind::Array])),
            ResolutionRule::Head => {
                self.find_static(PrimitiveOwner::ArrayHelper, "head", unary(Kind::Any))
            }
            ResolutionRule::Tail => {
                self.find_static(PrimitiveOwner::ArrayHelper, "tail", unary(Kind::Array))
            }
            ResolutionRule::IsEmpty => {
                self.find_static(PrimitiveOwner::ArrayHelper, "isEmpty", unary(Kind::Bool))
            }
        }
    }
}

impl MethodFinder for ArrayMethodFinder<'_> {
    #[tracing::instrument(
        level = "debug",
        skip(self),
        fields(operation = %self.name, receiver = %self.receiver_type, arity = self.arity)
    )]
    fn find(&self) -> ResolutionResult<ResolutionTarget> {
        let raw = self.resolve()?;
        let target = raw
            .adapt(self.signature, self.receiver_type.clone())
            .map_err(|cause| self.failure(cause))?;
        tracing::debug!(signature = %self.signature, "resolved array operation");
        Ok(target)
    }
}

fn element_get(element_type: ElementType) -> RawOperation {
    let getter = element_getter(element_type);
    RawOperation::new(
        format!("get[{}]", element_type),
        Signature::new(
            vec![Kind::Array, Kind::I64],
            Kind::for_element(element_type),
        ),
        move |args| {
            let arr = array_arg(args, 0)?;
            let index = to_index(&args[1])?;
            let storage = arr.read();
            getter(&storage, index)
        },
    )
}

fn element_set(element_type: ElementType) -> RawOperation {
    let setter = element_setter(element_type);
    RawOperation::new(
        format!("set[{}]", element_type),
        Signature::new(
            vec![Kind::Array, Kind::I64, Kind::for_element(element_type)],
            Kind::Void,
        ),
        move |args| {
            let arr = array_arg(args, 0)?;
            let index = to_index(&args[1])?;
            setter(&mut arr.write(), index, args[2].clone())?;
            Ok(Value::Nothing)
        },
    )
}
