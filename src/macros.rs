// Defines an enum that can be infallibly converted to/from its underlying integer
// representation, falling back to an `Unknown(ty)` variant instead of erroring. This mirrors
// how every OpenFlow wire enum must behave: switches and controllers must tolerate values added
// by newer protocol revisions rather than rejecting the whole message.
macro_rules! enum_with_unknown {
    (
        $( #[$enum_attr:meta] )*
        pub doc enum $name:ident($ty:ty) {
            $( $( #[$variant_attr:meta] )* $variant:ident = $value:expr ),+ $(,)*
        }
    ) => {
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
        $( #[$enum_attr] )*
        pub enum $name {
            $( $( #[$variant_attr] )* $variant, )+
            /// An unrecognized value for this field. Keeping this variant lets the codec
            /// tolerate values introduced by protocol revisions this crate does not implement.
            Unknown($ty),
        }

        impl ::core::convert::From<$ty> for $name {
            fn from(value: $ty) -> Self {
                match value {
                    $( $value => $name::$variant, )+
                    other => $name::Unknown(other),
                }
            }
        }

        impl ::core::convert::From<$name> for $ty {
            fn from(value: $name) -> Self {
                match value {
                    $( $name::$variant => $value, )+
                    $name::Unknown(other) => other,
                }
            }
        }
    }
}
