//! Generic syntax tree consumed by function discovery
//!
//! The parser adapter lowers swc's typed AST into this shape. Discovery only
//! reads it.
//!
//! Global invariants enforced:
//! - Every node owns its children, so the tree is finite and acyclic
//! - Named fields iterate in `Field` declaration order

use crate::span::SourceSpan;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of node kinds produced by the lowering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Script,
    Block,
    Function,
    /// Arrow function lowered with arrow discovery turned off
    Arrow,
    /// Method lowered with method discovery turned off
    Method,
    Class,
    Var,
    Identifier,
    This,
    Super,
    PrivateName,
    Literal,
    Template,
    Assign,
    /// Member access `a.b`
    Dot,
    /// Computed member access `a[b]`
    Index,
    Call,
    New,
    Object,
    Property,
    Array,
    Spread,
    Pattern,
    Unary,
    Binary,
    /// Conditional `a ? b : c`
    Hook,
    Comma,
    Yield,
    Await,
    If,
    For,
    ForIn,
    ForOf,
    While,
    Do,
    Try,
    Catch,
    Switch,
    Case,
    Label,
    With,
    Return,
    Throw,
    /// Expression statement
    Semicolon,
    Export,
    /// Constructs discovery never looks into (JSX, type-level declarations)
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Script => "script",
            NodeKind::Block => "block",
            NodeKind::Function => "function",
            NodeKind::Arrow => "arrow function",
            NodeKind::Method => "method",
            NodeKind::Class => "class",
            NodeKind::Var => "variable declaration",
            NodeKind::Identifier => "identifier",
            NodeKind::This => "this",
            NodeKind::Super => "super",
            NodeKind::PrivateName => "private name",
            NodeKind::Literal => "literal",
            NodeKind::Template => "template",
            NodeKind::Assign => "assignment",
            NodeKind::Dot => "member access",
            NodeKind::Index => "computed member access",
            NodeKind::Call => "call",
            NodeKind::New => "new",
            NodeKind::Object => "object literal",
            NodeKind::Property => "property",
            NodeKind::Array => "array literal",
            NodeKind::Spread => "spread",
            NodeKind::Pattern => "destructuring pattern",
            NodeKind::Unary => "unary expression",
            NodeKind::Binary => "binary expression",
            NodeKind::Hook => "conditional expression",
            NodeKind::Comma => "comma expression",
            NodeKind::Yield => "yield",
            NodeKind::Await => "await",
            NodeKind::If => "if",
            NodeKind::For => "for",
            NodeKind::ForIn => "for-in",
            NodeKind::ForOf => "for-of",
            NodeKind::While => "while",
            NodeKind::Do => "do-while",
            NodeKind::Try => "try",
            NodeKind::Catch => "catch",
            NodeKind::Switch => "switch",
            NodeKind::Case => "case",
            NodeKind::Label => "label",
            NodeKind::With => "with",
            NodeKind::Return => "return",
            NodeKind::Throw => "throw",
            NodeKind::Semicolon => "expression statement",
            NodeKind::Export => "export",
            NodeKind::Other => "other",
        }
    }

    /// Leaves whose `value` is usable as a name segment
    pub fn is_name_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier | NodeKind::This | NodeKind::Super | NodeKind::PrivateName
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a function node was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionForm {
    /// `function foo() {}` in statement position
    Declared,
    /// `function () {}` or `function foo() {}` in expression position
    Expressed,
    /// `() => {}`
    Arrow,
    /// Class or object-literal method, getter, setter, or constructor
    Method,
}

/// Child-bearing named fields, declared in enumeration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Initializer,
    Params,
    FunctionDecls,
    VariableDecls,
    Body,
    Expression,
    Condition,
    ThenPart,
    ElsePart,
    Setup,
    Update,
    Exception,
    Object,
    Iterator,
    VarDecl,
    Label,
    Target,
    TryBlock,
    CatchClauses,
    Guard,
    Block,
    Discriminant,
    Cases,
    CaseLabel,
    Statements,
    Statement,
}

/// Value of a named field
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    One(Box<SyntaxNode>),
    Many(Vec<SyntaxNode>),
}

/// A node of the lowered syntax tree
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Identifier name, `this`, or literal source text
    pub value: Option<String>,
    /// Declared name of a function node
    pub name: Option<String>,
    /// 1-based line of `span.start`
    pub lineno: u32,
    pub span: SourceSpan,
    pub form: Option<FunctionForm>,
    /// Compound assignment operator; `None` for plain `=`
    pub assign_op: Option<String>,
    operands: Vec<SyntaxNode>,
    fields: BTreeMap<Field, Child>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: SourceSpan, lineno: u32) -> Self {
        SyntaxNode {
            kind,
            value: None,
            name: None,
            lineno,
            span,
            form: None,
            assign_op: None,
            operands: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_form(mut self, form: FunctionForm) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_assign_op(mut self, op: Option<String>) -> Self {
        self.assign_op = op;
        self
    }

    pub fn with_operands(mut self, operands: Vec<SyntaxNode>) -> Self {
        self.operands = operands;
        self
    }

    /// Set a single-node field; `None` leaves the field absent
    pub fn with_field(mut self, field: Field, child: Option<SyntaxNode>) -> Self {
        if let Some(child) = child {
            self.fields.insert(field, Child::One(Box::new(child)));
        }
        self
    }

    /// Set a list-valued field; an empty list leaves the field absent
    pub fn with_list(mut self, field: Field, children: Vec<SyntaxNode>) -> Self {
        if !children.is_empty() {
            self.fields.insert(field, Child::Many(children));
        }
        self
    }

    pub fn operands(&self) -> &[SyntaxNode] {
        &self.operands
    }

    pub fn operand(&self, index: usize) -> Option<&SyntaxNode> {
        self.operands.get(index)
    }

    pub fn field(&self, field: Field) -> Option<&Child> {
        self.fields.get(&field)
    }

    /// Present named fields in enumeration order
    pub fn fields(&self) -> impl Iterator<Item = (Field, &Child)> {
        self.fields.iter().map(|(field, child)| (*field, child))
    }

    pub fn is_function(&self) -> bool {
        self.kind == NodeKind::Function
    }

    /// Function name, if present and non-empty
    pub fn function_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Move every direct child into `pending`, leaving this node a leaf
    fn detach_children(&mut self, pending: &mut Vec<SyntaxNode>) {
        pending.append(&mut self.operands);
        for child in std::mem::take(&mut self.fields).into_values() {
            match child {
                Child::One(only) => pending.push(*only),
                Child::Many(mut list) => pending.append(&mut list),
            }
        }
    }
}

// Trees can nest as deep as `max_depth`; tear them down without recursion
impl Drop for SyntaxNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}
