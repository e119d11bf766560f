//! Declarative helpers shared by the option enums.

/// Defines a form option enum with a stable key and a bilingual label.
///
/// The key is the serde representation; the label is accepted as an alias
/// so rows read back from a sheet can be parsed again. The first variant is
/// the form default.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($field:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => ($key:literal, $label:literal)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $key, alias = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in form order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable machine key (used in JSON, TOML and profiles).
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            /// Bilingual display label (written to the sheet).
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Catalogue entries for every option.
            pub fn options() -> Vec<$crate::catalogue::OptionEntry> {
                Self::ALL
                    .iter()
                    .map(|o| $crate::catalogue::OptionEntry {
                        key: o.key(),
                        label: o.label(),
                    })
                    .collect()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|o| o.key().eq_ignore_ascii_case(s) || o.label() == s)
                    .ok_or_else(|| $crate::Error::InvalidOption {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }
    };
}
