//! Well-known short names for catalog types that declare no alias of their own.

use phf::phf_map;

/// Qualified name → short name. Mirrors Java's implicit `java.lang` import.
static SHORTCUTS: phf::Map<&'static str, &'static str> = phf_map! {
    "java.lang.Object" => "Object",
    "java.lang.String" => "String",
    "java.lang.CharSequence" => "CharSequence",
    "java.lang.StringBuilder" => "StringBuilder",
    "java.lang.Number" => "Number",
    "java.lang.Integer" => "Integer",
    "java.lang.Long" => "Long",
    "java.lang.Double" => "Double",
    "java.lang.Boolean" => "Boolean",
    "java.lang.Character" => "Character",
    "java.lang.Math" => "Math",
    "java.lang.System" => "System",
    "java.lang.Thread" => "Thread",
    "java.lang.Class" => "Class",
    "java.lang.Throwable" => "Throwable",
    "java.lang.Exception" => "Exception",
    "java.lang.RuntimeException" => "RuntimeException",
};

/// Default short name for a qualified type name, if one is well known.
pub(crate) fn shortcut_for(qualified_name: &str) -> Option<&'static str> {
    SHORTCUTS.get(qualified_name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_lookup() {
        assert_eq!(shortcut_for("java.lang.String"), Some("String"));
        assert_eq!(shortcut_for("java.util.List"), None);
    }
}
