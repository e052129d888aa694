//! Element and attribute names of the persisted form format.

// Structure
pub const FORM: &str = "Form";
pub const NON_VISUAL_COMPONENTS: &str = "NonVisualComponents";
pub const CONTAINER: &str = "Container";
pub const COMPONENT: &str = "Component";
pub const SUB_COMPONENTS: &str = "SubComponents";
pub const PROPERTIES: &str = "Properties";
pub const PROPERTY: &str = "Property";
pub const SYNTHETIC_PROPERTIES: &str = "SyntheticProperties";
pub const SYNTHETIC_PROPERTY: &str = "SyntheticProperty";
pub const AUX_VALUES: &str = "AuxValues";
pub const AUX_VALUE: &str = "AuxValue";
pub const LAYOUT: &str = "Layout";
pub const LAYOUT_CODE: &str = "LayoutCode";
pub const CONSTRAINTS: &str = "Constraints";
pub const CONSTRAINT: &str = "Constraint";
pub const CONNECTION: &str = "Connection";
pub const PARAMETER: &str = "Parameter";
pub const SUB_BINDING: &str = "Subbinding";

// Code graph
pub const CODE_EXPRESSION: &str = "CodeExpression";
pub const CODE_VARIABLE: &str = "CodeVariable";
pub const EXPRESSION_ORIGIN: &str = "ExpressionOrigin";
pub const EXPRESSION_PROVIDER: &str = "ExpressionProvider";
pub const STATEMENT_PROVIDER: &str = "StatementProvider";
pub const CODE_STATEMENT: &str = "CodeStatement";
pub const PARAMETERS: &str = "Parameters";
pub const STATEMENTS: &str = "Statements";
pub const CODE_CONSTRUCTOR: &str = "CodeConstructor";
pub const CODE_METHOD: &str = "CodeMethod";
pub const CODE_FIELD: &str = "CodeField";
pub const COMPONENT_REF: &str = "ComponentRef";
pub const VALUE: &str = "Value";

// Attributes
pub const ATTR_VERSION: &str = "version";
pub const ATTR_MAX_VERSION: &str = "maxVersion";
pub const ATTR_TYPE: &str = "type";
pub const ATTR_NAME: &str = "name";
pub const ATTR_CLASS: &str = "class";
pub const ATTR_VALUE: &str = "value";
pub const ATTR_EDITOR: &str = "editor";
pub const ATTR_LAYOUT_CLASS: &str = "layoutClass";
pub const ATTR_ID: &str = "id";
pub const ATTR_DECLARED_TYPE: &str = "declaredType";
pub const ATTR_PARAMETER_TYPES: &str = "parameterTypes";
pub const ATTR_COMPONENT: &str = "component";
pub const ATTR_SOURCE_PATH: &str = "sourcePath";
pub const ATTR_TARGET_PATH: &str = "targetPath";
pub const ATTR_CODE_STRUCTURE: &str = "codeStructure";

pub const CODE_STRUCTURE_STATIC: &str = "static";

/// Editor name marking a property whose value is a design reference.
pub const CONNECTION_EDITOR: &str = "org.netbeans.modules.form.RADConnectionPropertyEditor";

/// Connection `type` attribute values.
pub const CONNECTION_PROPERTY: &str = "property";
pub const CONNECTION_METHOD: &str = "method";
pub const CONNECTION_CODE: &str = "code";

/// Aux value holding a component's layered-pane layer.
pub const AUX_LAYER: &str = "JLayeredPane.layer";

/// Package prefix of the persisted form-info type names.
pub const FORM_INFO_PACKAGE: &str = "org.netbeans.modules.form.forminfo.";
