//! Member signatures and the symbol-lookup seam.
//!
//! The code structure references constructors, methods and fields by
//! signature. Turning a persisted class/member name into a signature is
//! delegated to a [`SymbolResolver`], which may fail; the built-in
//! [`SymbolTable`] knows the toolkit classes the legacy layout tables and the
//! form loader need, and can be extended with [`ClassInfo`] records.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{TypeName, PRIMITIVES};

/// A resolved constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructorSig {
    pub declaring: TypeName,
    pub params: Vec<TypeName>,
}

/// A resolved method. `declaring` is the class the lookup started from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSig {
    pub declaring: TypeName,
    pub name: String,
    pub params: Vec<TypeName>,
    pub returns: TypeName,
}

/// A resolved field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSig {
    pub declaring: TypeName,
    pub name: String,
    pub ty: TypeName,
}

/// Signature lookup service consulted while decoding and converting code.
///
/// Every lookup is fallible: `None` means the symbol does not exist for the
/// given class.
pub trait SymbolResolver {
    /// Resolve a class (or primitive) name.
    fn resolve_class(&self, name: &str) -> Option<TypeName>;

    /// Resolve a constructor of `class` with exactly these parameter types.
    fn resolve_constructor(&self, class: &TypeName, params: &[TypeName]) -> Option<ConstructorSig>;

    /// Resolve a method of `class` (or one of its superclasses).
    fn resolve_method(&self, class: &TypeName, name: &str, params: &[TypeName]) -> Option<MethodSig>;

    /// Resolve a field of `class` (or one of its superclasses).
    fn resolve_field(&self, class: &TypeName, name: &str) -> Option<FieldSig>;

    /// Whether `class` is `ancestor` or inherits from it.
    fn is_subclass(&self, class: &TypeName, ancestor: &TypeName) -> bool;
}

// ---------------------------------------------------------------------------
// Class records
// ---------------------------------------------------------------------------

/// A method entry in a [`ClassInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default = "void")]
    pub returns: String,
}

/// A field entry in a [`ClassInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Everything the symbol table knows about one class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub constructors: Vec<Vec<String>>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

fn void() -> String {
    "void".to_string()
}

impl ClassInfo {
    pub fn new(name: &str, superclass: Option<&str>) -> Self {
        ClassInfo {
            name: name.to_string(),
            superclass: superclass.map(str::to_string),
            ..ClassInfo::default()
        }
    }

    pub fn constructor(mut self, params: &[&str]) -> Self {
        self.constructors
            .push(params.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn method(mut self, name: &str, params: &[&str], returns: &str) -> Self {
        self.methods.push(MethodInfo {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            returns: returns.to_string(),
        });
        self
    }

    pub fn field(mut self, name: &str, ty: &str) -> Self {
        self.fields.push(FieldInfo {
            name: name.to_string(),
            ty: ty.to_string(),
        });
        self
    }
}

// ---------------------------------------------------------------------------
// SymbolTable
// ---------------------------------------------------------------------------

/// In-memory [`SymbolResolver`] keyed by fully qualified class name.
///
/// Primitive type names always resolve. Member lookups walk the superclass
/// chain; a chain that loops back on itself simply stops.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    classes: HashMap<String, ClassInfo>,
}

impl SymbolTable {
    /// An empty table that only knows primitives.
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// A table preloaded with the toolkit classes forms are built from.
    pub fn with_builtins() -> Self {
        let mut table = SymbolTable::new();
        for class in builtin_classes() {
            table.register(class);
        }
        table
    }

    /// Add or replace a class record.
    pub fn register(&mut self, class: ClassInfo) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn class_info(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// The class itself followed by its known ancestors.
    fn lineage<'a>(&'a self, name: &str) -> Vec<&'a ClassInfo> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = self.classes.get(name);
        while let Some(info) = next {
            if !seen.insert(info.name.as_str()) {
                break;
            }
            chain.push(info);
            next = info
                .superclass
                .as_deref()
                .and_then(|sup| self.classes.get(sup));
        }
        chain
    }
}

fn params_match(declared: &[String], wanted: &[TypeName]) -> bool {
    declared.len() == wanted.len()
        && declared
            .iter()
            .zip(wanted)
            .all(|(d, w)| d == w.as_str())
}

impl SymbolResolver for SymbolTable {
    fn resolve_class(&self, name: &str) -> Option<TypeName> {
        if PRIMITIVES.contains(&name) || self.classes.contains_key(name) {
            Some(TypeName::new(name))
        } else {
            None
        }
    }

    fn resolve_constructor(&self, class: &TypeName, params: &[TypeName]) -> Option<ConstructorSig> {
        let info = self.classes.get(class.as_str())?;
        info.constructors
            .iter()
            .find(|declared| params_match(declared, params))
            .map(|_| ConstructorSig {
                declaring: class.clone(),
                params: params.to_vec(),
            })
    }

    fn resolve_method(&self, class: &TypeName, name: &str, params: &[TypeName]) -> Option<MethodSig> {
        self.lineage(class.as_str()).into_iter().find_map(|info| {
            info.methods
                .iter()
                .find(|m| m.name == name && params_match(&m.params, params))
                .map(|m| MethodSig {
                    declaring: class.clone(),
                    name: m.name.clone(),
                    params: params.to_vec(),
                    returns: TypeName::new(m.returns.as_str()),
                })
        })
    }

    fn resolve_field(&self, class: &TypeName, name: &str) -> Option<FieldSig> {
        self.lineage(class.as_str()).into_iter().find_map(|info| {
            info.fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| FieldSig {
                    declaring: class.clone(),
                    name: f.name.clone(),
                    ty: TypeName::new(f.ty.as_str()),
                })
        })
    }

    fn is_subclass(&self, class: &TypeName, ancestor: &TypeName) -> bool {
        self.lineage(class.as_str())
            .iter()
            .any(|info| info.name == ancestor.as_str())
    }
}

// ---------------------------------------------------------------------------
// Built-in toolkit classes
// ---------------------------------------------------------------------------

fn builtin_classes() -> Vec<ClassInfo> {
    use crate::types::{COMPONENT, CONTAINER, LAYOUT_MANAGER, OBJECT, STRING};
    const JCOMPONENT: &str = "javax.swing.JComponent";
    const ICON: &str = "javax.swing.Icon";

    let mut classes = vec![
        ClassInfo::new(OBJECT, None),
        ClassInfo::new(STRING, Some(OBJECT)),
        ClassInfo::new("java.lang.Boolean", Some(OBJECT)),
        ClassInfo::new("java.lang.Integer", Some(OBJECT)),
        ClassInfo::new("java.lang.Long", Some(OBJECT)),
        ClassInfo::new("java.lang.Double", Some(OBJECT)),
        ClassInfo::new("java.lang.Float", Some(OBJECT)),
        ClassInfo::new("java.lang.Character", Some(OBJECT)),
        ClassInfo::new(ICON, Some(OBJECT)),
        ClassInfo::new("java.awt.Color", Some(OBJECT)),
        ClassInfo::new("java.awt.Font", Some(OBJECT)),
        ClassInfo::new("java.awt.Dimension", Some(OBJECT))
            .constructor(&["int", "int"]),
        ClassInfo::new(LAYOUT_MANAGER, Some(OBJECT)),
        ClassInfo::new(COMPONENT, Some(OBJECT))
            .method("setBounds", &["int", "int", "int", "int"], "void")
            .method("getName", &[], STRING)
            .method("isEnabled", &[], "boolean")
            .method("isVisible", &[], "boolean"),
        ClassInfo::new(CONTAINER, Some(COMPONENT))
            .method("add", &[COMPONENT], COMPONENT)
            .method("add", &[COMPONENT, OBJECT], "void")
            .method("setLayout", &[LAYOUT_MANAGER], "void"),
        // Layout managers and their constraint objects.
        ClassInfo::new("java.awt.BorderLayout", Some(OBJECT))
            .constructor(&[])
            .constructor(&["int", "int"]),
        ClassInfo::new("java.awt.FlowLayout", Some(OBJECT))
            .constructor(&[])
            .constructor(&["int"])
            .constructor(&["int", "int", "int"]),
        ClassInfo::new("javax.swing.BoxLayout", Some(OBJECT))
            .constructor(&[CONTAINER, "int"]),
        ClassInfo::new("java.awt.GridBagLayout", Some(OBJECT)).constructor(&[]),
        ClassInfo::new("java.awt.GridLayout", Some(OBJECT))
            .constructor(&[])
            .constructor(&["int", "int"])
            .constructor(&["int", "int", "int", "int"]),
        ClassInfo::new("java.awt.CardLayout", Some(OBJECT))
            .constructor(&[])
            .constructor(&["int", "int"]),
        ClassInfo::new("org.netbeans.lib.awtextra.AbsoluteLayout", Some(OBJECT))
            .constructor(&[]),
        ClassInfo::new("org.netbeans.lib.awtextra.AbsoluteConstraints", Some(OBJECT))
            .constructor(&["int", "int", "int", "int"]),
        ClassInfo::new("java.awt.Insets", Some(OBJECT))
            .constructor(&["int", "int", "int", "int"]),
        ClassInfo::new("java.awt.GridBagConstraints", Some(OBJECT))
            .constructor(&[])
            .field("gridx", "int")
            .field("gridy", "int")
            .field("gridwidth", "int")
            .field("gridheight", "int")
            .field("fill", "int")
            .field("ipadx", "int")
            .field("ipady", "int")
            .field("anchor", "int")
            .field("weightx", "double")
            .field("weighty", "double")
            .field("insets", "java.awt.Insets"),
        // Swing containers with special child handling.
        ClassInfo::new(JCOMPONENT, Some(CONTAINER)),
        ClassInfo::new("javax.swing.JPanel", Some(JCOMPONENT)),
        ClassInfo::new("javax.swing.JScrollPane", Some(JCOMPONENT))
            .method("setViewportView", &[COMPONENT], "void"),
        ClassInfo::new("javax.swing.JSplitPane", Some(JCOMPONENT))
            .method("setTopComponent", &[COMPONENT], "void")
            .method("setBottomComponent", &[COMPONENT], "void")
            .method("setLeftComponent", &[COMPONENT], "void")
            .method("setRightComponent", &[COMPONENT], "void"),
        ClassInfo::new("javax.swing.JTabbedPane", Some(JCOMPONENT))
            .method("addTab", &[STRING, ICON, COMPONENT, STRING], "void")
            .method("addTab", &[STRING, ICON, COMPONENT], "void")
            .method("addTab", &[STRING, COMPONENT], "void"),
        ClassInfo::new("javax.swing.JLayeredPane", Some(JCOMPONENT)),
        ClassInfo::new("javax.swing.JToolBar", Some(JCOMPONENT)),
        ClassInfo::new("javax.swing.JDesktopPane", Some("javax.swing.JLayeredPane")),
        ClassInfo::new("java.awt.ScrollPane", Some(CONTAINER)),
        ClassInfo::new("java.awt.Panel", Some(CONTAINER)),
        ClassInfo::new("java.applet.Applet", Some("java.awt.Panel")),
        ClassInfo::new("java.awt.Window", Some(CONTAINER)),
        ClassInfo::new("java.awt.Frame", Some("java.awt.Window")),
        ClassInfo::new("java.awt.Dialog", Some("java.awt.Window")),
        // Top-level Swing windows delegate children to a content pane.
        ClassInfo::new("javax.swing.JFrame", Some("java.awt.Frame"))
            .method("getContentPane", &[], CONTAINER),
        ClassInfo::new("javax.swing.JDialog", Some("java.awt.Dialog"))
            .method("getContentPane", &[], CONTAINER),
        ClassInfo::new("javax.swing.JApplet", Some("java.applet.Applet"))
            .method("getContentPane", &[], CONTAINER),
        ClassInfo::new("javax.swing.JInternalFrame", Some(JCOMPONENT))
            .method("getContentPane", &[], CONTAINER),
    ];

    // Plain Swing widgets.
    for widget in [
        "javax.swing.JButton",
        "javax.swing.JToggleButton",
        "javax.swing.JCheckBox",
        "javax.swing.JRadioButton",
        "javax.swing.JLabel",
        "javax.swing.JTextField",
        "javax.swing.JTextArea",
        "javax.swing.JPasswordField",
        "javax.swing.JComboBox",
        "javax.swing.JList",
        "javax.swing.JTable",
        "javax.swing.JTree",
        "javax.swing.JSlider",
        "javax.swing.JProgressBar",
        "javax.swing.JSeparator",
    ] {
        classes.push(
            ClassInfo::new(widget, Some(JCOMPONENT))
                .method("getText", &[], STRING)
                .method("setText", &[STRING], "void"),
        );
    }

    // AWT widgets.
    for widget in ["java.awt.Button", "java.awt.Label", "java.awt.TextField", "java.awt.Checkbox"] {
        classes.push(ClassInfo::new(widget, Some(COMPONENT)));
    }

    classes.push(ClassInfo::new("javax.swing.ButtonGroup", Some(OBJECT)));
    classes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str) -> TypeName {
        TypeName::new(name)
    }

    #[test]
    fn primitives_always_resolve() {
        let table = SymbolTable::new();
        assert_eq!(table.resolve_class("int"), Some(TypeName::int()));
        assert_eq!(table.resolve_class("java.awt.BorderLayout"), None);
    }

    #[test]
    fn constructor_lookup_matches_exact_parameter_list() {
        let table = SymbolTable::with_builtins();
        let border = t("java.awt.BorderLayout");
        assert!(table.resolve_constructor(&border, &[]).is_some());
        assert!(table
            .resolve_constructor(&border, &[TypeName::int(), TypeName::int()])
            .is_some());
        assert!(table.resolve_constructor(&border, &[TypeName::int()]).is_none());
    }

    #[test]
    fn method_lookup_walks_superclasses() {
        let table = SymbolTable::with_builtins();
        let panel = t("javax.swing.JPanel");
        let sig = table
            .resolve_method(&panel, "setLayout", &[t("java.awt.LayoutManager")])
            .unwrap();
        assert_eq!(sig.declaring, panel);
        assert_eq!(sig.returns.as_str(), "void");

        let bounds = table
            .resolve_method(&panel, "setBounds", &vec![TypeName::int(); 4])
            .unwrap();
        assert_eq!(bounds.params.len(), 4);
    }

    #[test]
    fn field_lookup_reports_field_type() {
        let table = SymbolTable::with_builtins();
        let field = table
            .resolve_field(&t("java.awt.GridBagConstraints"), "weightx")
            .unwrap();
        assert_eq!(field.ty, TypeName::double());
        assert!(table
            .resolve_field(&t("java.awt.GridBagConstraints"), "gridX")
            .is_none());
    }

    #[test]
    fn subclass_check_follows_lineage() {
        let table = SymbolTable::with_builtins();
        assert!(table.is_subclass(&t("javax.swing.JFrame"), &t("java.awt.Window")));
        assert!(!table.is_subclass(&t("javax.swing.JPanel"), &t("java.awt.Window")));
    }

    #[test]
    fn superclass_loop_terminates() {
        let mut table = SymbolTable::new();
        table.register(ClassInfo::new("a.A", Some("a.B")));
        table.register(ClassInfo::new("a.B", Some("a.A")));
        assert!(table.resolve_method(&t("a.A"), "missing", &[]).is_none());
    }

    #[test]
    fn class_info_deserializes_with_defaults() {
        let info: ClassInfo = serde_json::from_str(
            r#"{"name": "com.acme.Gauge", "superclass": "javax.swing.JComponent",
                "methods": [{"name": "getLevel", "returns": "int"}]}"#,
        )
        .unwrap();
        assert!(info.constructors.is_empty());
        assert_eq!(info.methods[0].params.len(), 0);

        let mut table = SymbolTable::with_builtins();
        table.register(info);
        let sig = table
            .resolve_method(&t("com.acme.Gauge"), "add", &[t("java.awt.Component")])
            .unwrap();
        assert_eq!(sig.returns.as_str(), "java.awt.Component");
    }
}
