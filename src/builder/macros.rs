//! Macros for ergonomic machine construction.

/// Declare a plain enum and implement `Phase` for it.
///
/// # Example
///
/// ```
/// use turnstate::core::Phase;
/// use turnstate::phase_enum;
///
/// phase_enum! {
///     pub enum Round {
///         Open,
///         Betting,
///         Closed,
///     }
///     final: [Closed]
/// }
///
/// assert_eq!(Round::Betting.name(), "Betting");
/// assert!(Round::Closed.is_final());
/// ```
#[macro_export]
macro_rules! phase_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Phase for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::Phase;

    phase_enum! {
        enum TestPhase {
            Stumbling,
            Draw,
            Play,
            Over,
        }
        final: [Over]
    }

    #[test]
    fn phase_enum_macro_generates_trait() {
        assert_eq!(TestPhase::Stumbling.name(), "Stumbling");
        assert!(!TestPhase::Play.is_final());
        assert!(TestPhase::Over.is_final());
    }

    #[test]
    fn phase_enum_supports_visibility() {
        phase_enum! {
            pub enum PublicPhase {
                A,
                B,
            }
            final: [B]
        }

        let _phase = PublicPhase::A;
    }

    #[test]
    fn phase_enum_works_without_final() {
        phase_enum! {
            enum MinimalPhase {
                One,
                Two,
            }
        }

        assert!(!MinimalPhase::One.is_final());
        assert!(!MinimalPhase::Two.is_final());
    }

    #[test]
    fn phases_serialize_by_name() {
        let json = serde_json::to_string(&TestPhase::Draw).unwrap();
        assert_eq!(json, "\"Draw\"");
    }
}
