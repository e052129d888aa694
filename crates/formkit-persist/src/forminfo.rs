//! The fixed FormInfo table mapping old form type names to base classes.

use formkit_core::{SymbolResolver, TypeName};

use crate::names::FORM_INFO_PACKAGE;

/// `(short FormInfo name, base class)`, most specific class first.
const FORM_INFOS: [(&str, &str); 9] = [
    ("JFrameFormInfo", "javax.swing.JFrame"),
    ("JPanelFormInfo", "javax.swing.JPanel"),
    ("JDialogFormInfo", "javax.swing.JDialog"),
    ("JInternalFrameFormInfo", "javax.swing.JInternalFrame"),
    ("JAppletFormInfo", "javax.swing.JApplet"),
    ("FrameFormInfo", "java.awt.Frame"),
    ("AppletFormInfo", "java.applet.Applet"),
    ("DialogFormInfo", "java.awt.Dialog"),
    ("PanelFormInfo", "java.awt.Panel"),
];

/// The base class a persisted FormInfo type stands for. Only the part after
/// the last `.` is significant.
pub fn class_for_form_info(form_info: &str) -> Option<&'static str> {
    let short = form_info.rsplit('.').next().unwrap_or(form_info);
    FORM_INFOS
        .iter()
        .find(|(name, _)| *name == short)
        .map(|(_, class)| *class)
}

/// The FormInfo type written for `base_class`, if it derives from one of
/// the known classes.
pub fn form_info_for_class<S: SymbolResolver + ?Sized>(symbols: &S, base_class: &TypeName) -> Option<String> {
    FORM_INFOS
        .iter()
        .find(|(_, class)| symbols.is_subclass(base_class, &TypeName::new(*class)))
        .map(|(name, _)| format!("{}{}", FORM_INFO_PACKAGE, name))
}
