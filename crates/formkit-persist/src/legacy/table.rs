//! The fixed legacy layout table.
//!
//! One row per legacy layout kind, in the order the old format numbered
//! them. Each row names the legacy layout and constraints classes, the
//! stored parameter names with their current property names and defaults,
//! and the constructor shapes the current code uses.

use formkit_core::StandardLayout;

/// Default for a legacy parameter that was not stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Int(i64),
    Bool(bool),
}

/// Which stored parameters select a constructor shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Always,
    /// At least one of these parameter positions is stored.
    AnyOf(&'static [usize]),
    /// All of these parameter positions are stored.
    AllOf(&'static [usize]),
}

impl Presence {
    fn matches(self, stored: &[bool]) -> bool {
        let is_stored = |i: &usize| stored.get(*i).copied().unwrap_or(false);
        match self {
            Presence::Always => true,
            Presence::AnyOf(positions) => positions.iter().any(is_stored),
            Presence::AllOf(positions) => positions.iter().all(is_stored),
        }
    }
}

/// A constructor shape: the first `arity` parameters, when `when` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamShape {
    pub when: Presence,
    pub arity: usize,
}

/// One row of the legacy layout table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyLayoutEntry {
    pub layout: StandardLayout,
    pub legacy_class: &'static str,
    pub constraints_class: &'static str,
    /// Whether this kind's legacy constraints can be turned into code.
    pub reasonable_constraints: bool,
    /// Current layout manager or container class.
    pub current_class: Option<&'static str>,
    pub legacy_params: &'static [&'static str],
    /// Current property names, position for position with `legacy_params`.
    pub delegate_properties: &'static [Option<&'static str>],
    pub defaults: &'static [ParamDefault],
    /// Constructor shapes, first match wins; no match means no arguments.
    pub shapes: &'static [ParamShape],
    /// The layout constructor takes the container delegate first.
    pub takes_container: bool,
}

const PKG: &str = "org.netbeans.modules.form.compat2.layouts.";

macro_rules! layout_class {
    ($name:literal) => {
        concat!("org.netbeans.modules.form.compat2.layouts.", $name)
    };
}

const GAPS: &[Option<&str>] = &[Some("hgap"), Some("vgap")];

pub static LEGACY_LAYOUTS: [LegacyLayoutEntry; 14] = [
    LegacyLayoutEntry {
        layout: StandardLayout::Border,
        legacy_class: layout_class!("DesignBorderLayout"),
        constraints_class: layout_class!("DesignBorderLayout$BorderConstraintsDescription"),
        reasonable_constraints: true,
        current_class: Some("java.awt.BorderLayout"),
        legacy_params: &["horizontalGap", "verticalGap"],
        delegate_properties: GAPS,
        defaults: &[ParamDefault::Int(0), ParamDefault::Int(0)],
        shapes: &[ParamShape { when: Presence::AnyOf(&[0, 1]), arity: 2 }],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::Flow,
        legacy_class: layout_class!("DesignFlowLayout"),
        constraints_class: layout_class!("DesignFlowLayout$FlowConstraintsDescription"),
        reasonable_constraints: false,
        current_class: Some("java.awt.FlowLayout"),
        legacy_params: &["alignment", "horizontalGap", "verticalGap"],
        delegate_properties: &[Some("alignment"), Some("hgap"), Some("vgap")],
        defaults: &[ParamDefault::Int(1), ParamDefault::Int(5), ParamDefault::Int(5)],
        shapes: &[
            ParamShape { when: Presence::AnyOf(&[1, 2]), arity: 3 },
            ParamShape { when: Presence::AnyOf(&[0]), arity: 1 },
        ],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::Box,
        legacy_class: layout_class!("DesignBoxLayout"),
        constraints_class: layout_class!("DesignBoxLayout$BoxConstraintsDescription"),
        reasonable_constraints: false,
        current_class: Some("javax.swing.BoxLayout"),
        legacy_params: &["axis"],
        delegate_properties: &[Some("axis")],
        // BoxLayout.LINE_AXIS
        defaults: &[ParamDefault::Int(2)],
        shapes: &[ParamShape { when: Presence::Always, arity: 1 }],
        takes_container: true,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::GridBag,
        legacy_class: layout_class!("DesignGridBagLayout"),
        constraints_class: layout_class!("DesignGridBagLayout$GridBagConstraintsDescription"),
        reasonable_constraints: true,
        current_class: Some("java.awt.GridBagLayout"),
        legacy_params: &[],
        delegate_properties: &[],
        defaults: &[],
        shapes: &[],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::Grid,
        legacy_class: layout_class!("DesignGridLayout"),
        constraints_class: layout_class!("DesignGridLayout$GridConstraintsDescription"),
        reasonable_constraints: false,
        current_class: Some("java.awt.GridLayout"),
        legacy_params: &["rows", "columns", "horizontalGap", "verticalGap"],
        delegate_properties: &[Some("rows"), Some("columns"), Some("hgap"), Some("vgap")],
        defaults: &[
            ParamDefault::Int(1),
            ParamDefault::Int(0),
            ParamDefault::Int(0),
            ParamDefault::Int(0),
        ],
        shapes: &[
            ParamShape { when: Presence::AnyOf(&[2, 3]), arity: 4 },
            ParamShape { when: Presence::AnyOf(&[0, 1]), arity: 2 },
        ],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::Card,
        legacy_class: layout_class!("DesignCardLayout"),
        constraints_class: layout_class!("DesignCardLayout$CardConstraintsDescription"),
        reasonable_constraints: true,
        current_class: Some("java.awt.CardLayout"),
        legacy_params: &["horizontalGap", "verticalGap"],
        delegate_properties: GAPS,
        defaults: &[ParamDefault::Int(0), ParamDefault::Int(0)],
        shapes: &[ParamShape { when: Presence::AllOf(&[0, 1]), arity: 2 }],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::Absolute,
        legacy_class: layout_class!("DesignAbsoluteLayout"),
        constraints_class: layout_class!("DesignAbsoluteLayout$AbsoluteConstraintsDescription"),
        reasonable_constraints: true,
        current_class: Some("org.netbeans.lib.awtextra.AbsoluteLayout"),
        legacy_params: &["useNullLayout"],
        delegate_properties: &[None],
        defaults: &[ParamDefault::Bool(false)],
        shapes: &[],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::Null,
        legacy_class: layout_class!("DesignAbsoluteLayout"),
        constraints_class: layout_class!("DesignAbsoluteLayout$AbsoluteConstraintsDescription"),
        reasonable_constraints: true,
        current_class: None,
        legacy_params: &["useNullLayout"],
        delegate_properties: &[None],
        defaults: &[ParamDefault::Bool(true)],
        shapes: &[],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::JScrollPane,
        legacy_class: layout_class!("support.JScrollPaneSupportLayout"),
        constraints_class: layout_class!("support.JScrollPaneSupportLayout$JScrollPaneConstraintsDescription"),
        reasonable_constraints: false,
        current_class: Some("javax.swing.JScrollPane"),
        legacy_params: &[],
        delegate_properties: &[],
        defaults: &[],
        shapes: &[],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::ScrollPane,
        legacy_class: layout_class!("support.ScrollPaneSupportLayout"),
        constraints_class: layout_class!("support.ScrollPaneSupportLayout$ScrollPaneConstraintsDescription"),
        reasonable_constraints: false,
        current_class: Some("java.awt.ScrollPane"),
        legacy_params: &[],
        delegate_properties: &[],
        defaults: &[],
        shapes: &[],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::JSplitPane,
        legacy_class: layout_class!("support.JSplitPaneSupportLayout"),
        constraints_class: layout_class!("support.JSplitPaneSupportLayout$JSplitPaneConstraintsDescription"),
        reasonable_constraints: true,
        current_class: Some("javax.swing.JSplitPane"),
        legacy_params: &[],
        delegate_properties: &[],
        defaults: &[],
        shapes: &[],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::JTabbedPane,
        legacy_class: layout_class!("support.JTabbedPaneSupportLayout"),
        constraints_class: layout_class!("support.JTabbedPaneSupportLayout$JTabbedPaneConstraintsDescription"),
        reasonable_constraints: true,
        current_class: Some("javax.swing.JTabbedPane"),
        legacy_params: &[],
        delegate_properties: &[],
        defaults: &[],
        shapes: &[],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::JLayeredPane,
        legacy_class: layout_class!("support.JLayeredPaneSupportLayout"),
        constraints_class: layout_class!("support.JLayeredPaneSupportLayout$JLayeredPaneConstraintsDescription"),
        reasonable_constraints: true,
        current_class: Some("javax.swing.JLayeredPane"),
        legacy_params: &[],
        delegate_properties: &[],
        defaults: &[],
        shapes: &[],
        takes_container: false,
    },
    LegacyLayoutEntry {
        layout: StandardLayout::ToolBar,
        legacy_class: layout_class!("DesignBoxLayout"),
        constraints_class: layout_class!("DesignBoxLayout$BoxConstraintsDescription"),
        reasonable_constraints: false,
        current_class: Some("javax.swing.JToolBar"),
        legacy_params: &["axis"],
        delegate_properties: &[None],
        defaults: &[ParamDefault::Int(2)],
        shapes: &[],
        takes_container: false,
    },
];

impl LegacyLayoutEntry {
    /// Number of leading parameters the current constructor takes, given
    /// which legacy parameters were stored.
    pub fn arity(&self, stored: &[bool]) -> usize {
        self.shapes
            .iter()
            .find(|shape| shape.when.matches(stored))
            .map(|shape| shape.arity)
            .unwrap_or(0)
    }
}

/// The first row whose legacy layout class is `class`.
pub fn entry_for_layout_class(class: &str) -> Option<&'static LegacyLayoutEntry> {
    LEGACY_LAYOUTS.iter().find(|e| e.legacy_class == class)
}

/// The first row whose legacy constraints class is `class`.
pub fn entry_for_constraints_class(class: &str) -> Option<&'static LegacyLayoutEntry> {
    LEGACY_LAYOUTS.iter().find(|e| e.constraints_class == class)
}

/// The row of a standard layout kind.
pub fn entry(layout: StandardLayout) -> &'static LegacyLayoutEntry {
    LEGACY_LAYOUTS
        .iter()
        .find(|e| e.layout == layout)
        .unwrap_or(&LEGACY_LAYOUTS[0])
}

/// Whether `class` belongs to the legacy layout package.
pub fn is_legacy_layout_class(class: &str) -> bool {
    class.starts_with(PKG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_positionally_consistent() {
        for row in &LEGACY_LAYOUTS {
            assert_eq!(row.legacy_params.len(), row.delegate_properties.len(), "{:?}", row.layout);
            assert_eq!(row.legacy_params.len(), row.defaults.len(), "{:?}", row.layout);
            for shape in row.shapes {
                let extra = usize::from(row.takes_container);
                assert!(shape.arity <= row.legacy_params.len() + extra, "{:?}", row.layout);
            }
            assert!(is_legacy_layout_class(row.legacy_class));
        }
    }

    #[test]
    fn lookups_return_first_matching_row() {
        let box_row = entry_for_layout_class(layout_class!("DesignBoxLayout")).unwrap();
        assert_eq!(box_row.layout, StandardLayout::Box);
        let abs = entry_for_layout_class(layout_class!("DesignAbsoluteLayout")).unwrap();
        assert_eq!(abs.layout, StandardLayout::Absolute);
        let tabs = entry_for_constraints_class(layout_class!(
            "support.JTabbedPaneSupportLayout$JTabbedPaneConstraintsDescription"
        ))
        .unwrap();
        assert_eq!(tabs.layout, StandardLayout::JTabbedPane);
        assert!(entry_for_layout_class("java.awt.BorderLayout").is_none());
    }

    #[test]
    fn reasonable_flags_follow_the_legacy_numbering() {
        let flags: Vec<bool> = LEGACY_LAYOUTS.iter().map(|e| e.reasonable_constraints).collect();
        assert_eq!(
            flags,
            vec![true, false, false, true, false, true, true, true, false, false, true, true, true, false]
        );
    }

    #[test]
    fn arity_selection() {
        let border = entry(StandardLayout::Border);
        assert_eq!(border.arity(&[true, false]), 2);
        assert_eq!(border.arity(&[false, false]), 0);

        let flow = entry(StandardLayout::Flow);
        assert_eq!(flow.arity(&[false, false, true]), 3);
        assert_eq!(flow.arity(&[true, false, false]), 1);
        assert_eq!(flow.arity(&[false, false, false]), 0);

        let grid = entry(StandardLayout::Grid);
        assert_eq!(grid.arity(&[false, true, false, false]), 2);
        assert_eq!(grid.arity(&[false, false, false, true]), 4);

        let card = entry(StandardLayout::Card);
        assert_eq!(card.arity(&[true, false]), 0);
        assert_eq!(card.arity(&[true, true]), 2);

        assert_eq!(entry(StandardLayout::Box).arity(&[false]), 1);
    }
}
