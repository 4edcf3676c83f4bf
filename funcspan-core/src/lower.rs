//! Lowering from the SWC AST into the generic syntax tree
//!
//! Global invariants enforced:
//! - Spans are byte offsets into the whole input document (half-open)
//! - Children are lowered in source order
//! - Nesting beyond `max_depth` statements/expressions/patterns is an error
//!
//! Shapes produced for the constructs discovery cares about:
//! - `function f() {}` -> Function { name: "f", form: Declared }
//! - `var x = e` -> Var [ Assign [ Identifier x, e ] ]
//! - `t = e` / `t += e` -> Assign [ t, e ] with `assign_op`
//! - `a.b` -> Dot [ a, Identifier b ]; `a[b]` -> Index [ a, b ]
//! - `() => {}` -> Function { form: Arrow } (or Arrow when disabled)
//! - methods, getters, setters, constructors -> Method, or
//!   Function { name: key, form: Method } when enabled

use crate::error::StructuralError;
use crate::node::{Field, FunctionForm, NodeKind, SyntaxNode};
use crate::span::{LineIndex, SourceSpan};
use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::*;

pub const DEFAULT_MAX_DEPTH: usize = 1024;

type Lowered = Result<SyntaxNode, StructuralError>;

/// Lowering switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowerOptions {
    /// Lower arrow functions as function nodes
    pub arrow_functions: bool,
    /// Lower methods, accessors, and constructors as named function nodes
    ///
    /// Off by default: a method slice is not a standalone function, and bare
    /// keys such as `constructor` collide across classes.
    pub methods: bool,
    /// Maximum statement/expression/pattern nesting
    pub max_depth: usize,
}

impl Default for LowerOptions {
    fn default() -> Self {
        LowerOptions {
            arrow_functions: true,
            methods: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Converts one parsed SWC program into a `SyntaxNode` tree
pub struct Lowerer<'a> {
    /// Whole input document
    text: &'a str,
    lines: &'a LineIndex,
    /// Position of the parsed file's first byte in the SWC source map
    file_start: BytePos,
    /// Offset of the parsed text inside the document
    offset: usize,
    options: LowerOptions,
    depth: usize,
}

impl<'a> Lowerer<'a> {
    pub fn new(
        text: &'a str,
        lines: &'a LineIndex,
        file_start: BytePos,
        offset: usize,
        options: LowerOptions,
    ) -> Self {
        Lowerer {
            text,
            lines,
            file_start,
            offset,
            options,
            depth: 0,
        }
    }

    /// Lower a whole program into a `Script` node
    pub fn lower_program(&mut self, program: &Program) -> Lowered {
        match program {
            Program::Module(module) => {
                let mut statements = Vec::with_capacity(module.body.len());
                for item in &module.body {
                    if let Some(node) = self.lower_module_item(item)? {
                        statements.push(node);
                    }
                }
                Ok(self
                    .node(NodeKind::Script, module.span)
                    .with_operands(statements))
            }
            Program::Script(script) => {
                let statements = self.lower_stmts(&script.body)?;
                Ok(self
                    .node(NodeKind::Script, script.span)
                    .with_operands(statements))
            }
        }
    }

    // ------------------------------------------------------------------
    // Spans and node construction
    // ------------------------------------------------------------------

    fn span_between(&self, lo: BytePos, hi: BytePos) -> SourceSpan {
        let start = lo.0.saturating_sub(self.file_start.0) as usize;
        let end = hi.0.saturating_sub(self.file_start.0) as usize;
        SourceSpan::new(start, end).shifted(self.offset)
    }

    fn source_span(&self, span: Span) -> SourceSpan {
        self.span_between(span.lo, span.hi)
    }

    fn node(&self, kind: NodeKind, span: Span) -> SyntaxNode {
        self.node_at(kind, self.source_span(span))
    }

    fn node_at(&self, kind: NodeKind, span: SourceSpan) -> SyntaxNode {
        SyntaxNode::new(kind, span, self.lines.line_of(span.start))
    }

    fn ident_node(&self, ident: &Ident) -> SyntaxNode {
        self.node(NodeKind::Identifier, ident.span)
            .with_value(ident.sym.to_string())
    }

    fn ident_name_node(&self, ident: &IdentName) -> SyntaxNode {
        self.node(NodeKind::Identifier, ident.span)
            .with_value(ident.sym.to_string())
    }

    fn private_name_node(&self, name: &PrivateName) -> SyntaxNode {
        self.node(NodeKind::PrivateName, name.span)
            .with_value(format!("#{}", name.name))
    }

    fn descend(&mut self, span: Span) -> Result<(), StructuralError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(StructuralError::TooDeep {
                limit: self.options.max_depth,
                line: self.lines.line_of(self.source_span(span).start),
            });
        }
        Ok(())
    }

    fn function_kind(&self, form: FunctionForm) -> NodeKind {
        match form {
            FunctionForm::Arrow if !self.options.arrow_functions => NodeKind::Arrow,
            FunctionForm::Method if !self.options.methods => NodeKind::Method,
            _ => NodeKind::Function,
        }
    }

    fn function_node(
        &self,
        name: Option<String>,
        form: FunctionForm,
        span: SourceSpan,
        params: Vec<SyntaxNode>,
        body: SyntaxNode,
    ) -> SyntaxNode {
        self.node_at(self.function_kind(form), span)
            .with_name(name)
            .with_form(form)
            .with_list(Field::Params, params)
            .with_field(Field::Body, Some(body))
    }

    // ------------------------------------------------------------------
    // Module items and declarations
    // ------------------------------------------------------------------

    fn lower_module_item(&mut self, item: &ModuleItem) -> Result<Option<SyntaxNode>, StructuralError> {
        match item {
            ModuleItem::Stmt(stmt) => self.lower_stmt(stmt).map(Some),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                self.lower_decl(&export.decl).map(Some)
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl {
                DefaultDecl::Fn(fn_expr) => self
                    .lower_function(
                        &fn_expr.function,
                        fn_expr.ident.as_ref().map(|id| id.sym.to_string()),
                        FunctionForm::Declared,
                        self.source_span(fn_expr.function.span),
                    )
                    .map(Some),
                DefaultDecl::Class(class_expr) => self
                    .lower_class(
                        &class_expr.class,
                        class_expr.ident.as_ref().map(|id| id.sym.to_string()),
                    )
                    .map(Some),
                _ => Ok(None),
            },
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                let expr = self.lower_expr(&export.expr)?;
                Ok(Some(
                    self.node(NodeKind::Export, export.span)
                        .with_field(Field::Expression, Some(expr)),
                ))
            }
            // Imports and re-exports declare no functions
            ModuleItem::ModuleDecl(_) => Ok(None),
        }
    }

    fn lower_decl(&mut self, decl: &Decl) -> Lowered {
        match decl {
            Decl::Fn(fn_decl) => self.lower_function(
                &fn_decl.function,
                Some(fn_decl.ident.sym.to_string()),
                FunctionForm::Declared,
                self.source_span(fn_decl.function.span),
            ),
            Decl::Var(var) => self.lower_var_decl(var),
            Decl::Class(class_decl) => {
                self.lower_class(&class_decl.class, Some(class_decl.ident.sym.to_string()))
            }
            // Type-level declarations and `using`
            other => Ok(self.node(NodeKind::Other, other.span())),
        }
    }

    fn lower_var_decl(&mut self, var: &VarDecl) -> Lowered {
        let mut declarators = Vec::with_capacity(var.decls.len());
        for declarator in &var.decls {
            let target = self.lower_pat(&declarator.name)?;
            let lowered = match &declarator.init {
                Some(init) => {
                    let value = self.lower_expr(init)?;
                    self.node(NodeKind::Assign, declarator.span)
                        .with_operands(vec![target, value])
                }
                None => target,
            };
            declarators.push(lowered);
        }
        Ok(self.node(NodeKind::Var, var.span).with_operands(declarators))
    }

    /// Lower a function with a body; bodiless signatures become `Other`
    fn lower_function(
        &mut self,
        function: &Function,
        name: Option<String>,
        form: FunctionForm,
        span: SourceSpan,
    ) -> Lowered {
        let Some(body) = &function.body else {
            return Ok(self.node_at(NodeKind::Other, span));
        };

        let mut params = Vec::with_capacity(function.params.len());
        for param in &function.params {
            params.push(self.lower_pat(&param.pat)?);
        }
        let body = self.lower_block(body)?;

        Ok(self.function_node(name, form, span, params, body))
    }

    fn lower_arrow(&mut self, arrow: &ArrowExpr) -> Lowered {
        let mut params = Vec::with_capacity(arrow.params.len());
        for param in &arrow.params {
            params.push(self.lower_pat(param)?);
        }
        let body = match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => self.lower_block(block)?,
            BlockStmtOrExpr::Expr(expr) => self.lower_expr(expr)?,
        };

        Ok(self.function_node(
            None,
            FunctionForm::Arrow,
            self.source_span(arrow.span),
            params,
            body,
        ))
    }

    fn lower_class(&mut self, class: &Class, name: Option<String>) -> Lowered {
        let super_class = self.lower_opt_expr(class.super_class.as_deref())?;

        let mut members = Vec::with_capacity(class.body.len());
        for member in &class.body {
            members.push(self.lower_class_member(member)?);
        }

        let mut node = self
            .node(NodeKind::Class, class.span)
            .with_operands(members)
            .with_field(Field::Expression, super_class);
        node.value = name;
        Ok(node)
    }

    fn lower_class_member(&mut self, member: &ClassMember) -> Lowered {
        match member {
            ClassMember::Method(method) => self.lower_function(
                &method.function,
                prop_name(&method.key),
                FunctionForm::Method,
                self.source_span(method.span),
            ),
            ClassMember::PrivateMethod(method) => self.lower_function(
                &method.function,
                Some(format!("#{}", method.key.name)),
                FunctionForm::Method,
                self.source_span(method.span),
            ),
            ClassMember::Constructor(ctor) => self.lower_constructor(ctor),
            ClassMember::ClassProp(prop) => {
                let key = self.lower_prop_name(&prop.key)?;
                let mut operands = vec![key];
                if let Some(value) = &prop.value {
                    operands.push(self.lower_expr(value)?);
                }
                Ok(self.node(NodeKind::Property, prop.span).with_operands(operands))
            }
            ClassMember::PrivateProp(prop) => {
                let mut operands = vec![self.private_name_node(&prop.key)];
                if let Some(value) = &prop.value {
                    operands.push(self.lower_expr(value)?);
                }
                Ok(self.node(NodeKind::Property, prop.span).with_operands(operands))
            }
            ClassMember::StaticBlock(block) => self.lower_block(&block.body),
            other => Ok(self.node(NodeKind::Other, other.span())),
        }
    }

    fn lower_constructor(&mut self, ctor: &Constructor) -> Lowered {
        let span = self.source_span(ctor.span);
        let Some(body) = &ctor.body else {
            return Ok(self.node_at(NodeKind::Other, span));
        };

        let mut params = Vec::new();
        for param in &ctor.params {
            // TypeScript parameter properties carry no nested functions worth finding
            if let ParamOrTsParamProp::Param(param) = param {
                params.push(self.lower_pat(&param.pat)?);
            }
        }
        let body = self.lower_block(body)?;

        Ok(self.function_node(
            prop_name(&ctor.key),
            FunctionForm::Method,
            span,
            params,
            body,
        ))
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn lower_stmts(&mut self, stmts: &[Stmt]) -> Result<Vec<SyntaxNode>, StructuralError> {
        let mut lowered = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            lowered.push(self.lower_stmt(stmt)?);
        }
        Ok(lowered)
    }

    fn lower_block(&mut self, block: &BlockStmt) -> Lowered {
        let statements = self.lower_stmts(&block.stmts)?;
        Ok(self.node(NodeKind::Block, block.span).with_operands(statements))
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Lowered {
        self.descend(stmt.span())?;
        let lowered = self.lower_stmt_inner(stmt);
        self.depth -= 1;
        lowered
    }

    fn lower_stmt_inner(&mut self, stmt: &Stmt) -> Lowered {
        match stmt {
            Stmt::Block(block) => self.lower_block(block),
            Stmt::Expr(expr_stmt) => {
                let expr = self.lower_expr(&expr_stmt.expr)?;
                Ok(self
                    .node(NodeKind::Semicolon, expr_stmt.span)
                    .with_field(Field::Expression, Some(expr)))
            }
            Stmt::Decl(decl) => self.lower_decl(decl),
            Stmt::Return(ret) => {
                let arg = self.lower_opt_expr(ret.arg.as_deref())?;
                Ok(self
                    .node(NodeKind::Return, ret.span)
                    .with_field(Field::Expression, arg))
            }
            Stmt::Throw(throw) => {
                let arg = self.lower_expr(&throw.arg)?;
                Ok(self
                    .node(NodeKind::Throw, throw.span)
                    .with_field(Field::Exception, Some(arg)))
            }
            Stmt::If(if_stmt) => {
                let condition = self.lower_expr(&if_stmt.test)?;
                let then_part = self.lower_stmt(&if_stmt.cons)?;
                let else_part = match &if_stmt.alt {
                    Some(alt) => Some(self.lower_stmt(alt)?),
                    None => None,
                };
                Ok(self
                    .node(NodeKind::If, if_stmt.span)
                    .with_field(Field::Condition, Some(condition))
                    .with_field(Field::ThenPart, Some(then_part))
                    .with_field(Field::ElsePart, else_part))
            }
            Stmt::Switch(switch) => {
                let discriminant = self.lower_expr(&switch.discriminant)?;
                let mut cases = Vec::with_capacity(switch.cases.len());
                for case in &switch.cases {
                    let label = self.lower_opt_expr(case.test.as_deref())?;
                    let statements = self.lower_stmts(&case.cons)?;
                    cases.push(
                        self.node(NodeKind::Case, case.span)
                            .with_field(Field::CaseLabel, label)
                            .with_list(Field::Statements, statements),
                    );
                }
                Ok(self
                    .node(NodeKind::Switch, switch.span)
                    .with_field(Field::Discriminant, Some(discriminant))
                    .with_list(Field::Cases, cases))
            }
            Stmt::Try(try_stmt) => {
                let try_block = self.lower_block(&try_stmt.block)?;
                let mut catch_clauses = Vec::new();
                if let Some(handler) = &try_stmt.handler {
                    let param = match &handler.param {
                        Some(param) => Some(self.lower_pat(param)?),
                        None => None,
                    };
                    let body = self.lower_block(&handler.body)?;
                    catch_clauses.push(
                        self.node(NodeKind::Catch, handler.span)
                            .with_field(Field::VarDecl, param)
                            .with_field(Field::Block, Some(body)),
                    );
                }
                let finally_block = match &try_stmt.finalizer {
                    Some(finalizer) => Some(self.lower_block(finalizer)?),
                    None => None,
                };
                Ok(self
                    .node(NodeKind::Try, try_stmt.span)
                    .with_field(Field::TryBlock, Some(try_block))
                    .with_list(Field::CatchClauses, catch_clauses)
                    .with_field(Field::Block, finally_block))
            }
            Stmt::While(while_stmt) => {
                let condition = self.lower_expr(&while_stmt.test)?;
                let body = self.lower_stmt(&while_stmt.body)?;
                Ok(self
                    .node(NodeKind::While, while_stmt.span)
                    .with_field(Field::Condition, Some(condition))
                    .with_field(Field::Body, Some(body)))
            }
            Stmt::DoWhile(do_while) => {
                let body = self.lower_stmt(&do_while.body)?;
                let condition = self.lower_expr(&do_while.test)?;
                Ok(self
                    .node(NodeKind::Do, do_while.span)
                    .with_field(Field::Body, Some(body))
                    .with_field(Field::Condition, Some(condition)))
            }
            Stmt::For(for_stmt) => {
                let setup = match &for_stmt.init {
                    Some(VarDeclOrExpr::VarDecl(var)) => Some(self.lower_var_decl(var)?),
                    Some(VarDeclOrExpr::Expr(expr)) => Some(self.lower_expr(expr)?),
                    None => None,
                };
                let condition = self.lower_opt_expr(for_stmt.test.as_deref())?;
                let update = self.lower_opt_expr(for_stmt.update.as_deref())?;
                let body = self.lower_stmt(&for_stmt.body)?;
                Ok(self
                    .node(NodeKind::For, for_stmt.span)
                    .with_field(Field::Setup, setup)
                    .with_field(Field::Condition, condition)
                    .with_field(Field::Update, update)
                    .with_field(Field::Body, Some(body)))
            }
            Stmt::ForIn(for_in) => {
                let iterator = self.lower_for_head(&for_in.left)?;
                let object = self.lower_expr(&for_in.right)?;
                let body = self.lower_stmt(&for_in.body)?;
                Ok(self
                    .node(NodeKind::ForIn, for_in.span)
                    .with_field(Field::Iterator, Some(iterator))
                    .with_field(Field::Object, Some(object))
                    .with_field(Field::Body, Some(body)))
            }
            Stmt::ForOf(for_of) => {
                let iterator = self.lower_for_head(&for_of.left)?;
                let object = self.lower_expr(&for_of.right)?;
                let body = self.lower_stmt(&for_of.body)?;
                Ok(self
                    .node(NodeKind::ForOf, for_of.span)
                    .with_field(Field::Iterator, Some(iterator))
                    .with_field(Field::Object, Some(object))
                    .with_field(Field::Body, Some(body)))
            }
            Stmt::Labeled(labeled) => {
                let statement = self.lower_stmt(&labeled.body)?;
                Ok(self
                    .node(NodeKind::Label, labeled.span)
                    .with_value(labeled.label.sym.to_string())
                    .with_field(Field::Statement, Some(statement)))
            }
            Stmt::With(with) => {
                let object = self.lower_expr(&with.obj)?;
                let body = self.lower_stmt(&with.body)?;
                Ok(self
                    .node(NodeKind::With, with.span)
                    .with_field(Field::Object, Some(object))
                    .with_field(Field::Body, Some(body)))
            }
            Stmt::Empty(empty) => Ok(self.node(NodeKind::Other, empty.span)),
            Stmt::Debugger(debugger) => Ok(self.node(NodeKind::Other, debugger.span)),
            Stmt::Break(brk) => Ok(self.node(NodeKind::Other, brk.span)),
            Stmt::Continue(cont) => Ok(self.node(NodeKind::Other, cont.span)),
        }
    }

    fn lower_for_head(&mut self, head: &ForHead) -> Lowered {
        match head {
            ForHead::VarDecl(var) => self.lower_var_decl(var),
            ForHead::Pat(pat) => self.lower_pat(pat),
            ForHead::UsingDecl(using) => Ok(self.node(NodeKind::Other, using.span)),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn lower_opt_expr(&mut self, expr: Option<&Expr>) -> Result<Option<SyntaxNode>, StructuralError> {
        expr.map(|expr| self.lower_expr(expr)).transpose()
    }

    fn lower_expr(&mut self, expr: &Expr) -> Lowered {
        self.descend(expr.span())?;
        let lowered = self.lower_expr_inner(expr);
        self.depth -= 1;
        lowered
    }

    fn lower_expr_inner(&mut self, expr: &Expr) -> Lowered {
        match expr {
            Expr::Ident(ident) => Ok(self.ident_node(ident)),
            Expr::This(this) => Ok(self.node(NodeKind::This, this.span).with_value("this")),
            Expr::Lit(lit) => {
                let span = self.source_span(lit.span());
                let text = span.slice(self.text).unwrap_or_default().to_string();
                Ok(self.node_at(NodeKind::Literal, span).with_value(text))
            }
            Expr::Fn(fn_expr) => self.lower_function(
                &fn_expr.function,
                fn_expr.ident.as_ref().map(|id| id.sym.to_string()),
                FunctionForm::Expressed,
                self.source_span(fn_expr.function.span),
            ),
            Expr::Arrow(arrow) => self.lower_arrow(arrow),
            Expr::Class(class_expr) => self.lower_class(
                &class_expr.class,
                class_expr.ident.as_ref().map(|id| id.sym.to_string()),
            ),
            Expr::Assign(assign) => {
                let target = self.lower_assign_target(&assign.left)?;
                let value = self.lower_expr(&assign.right)?;
                let op = (assign.op != AssignOp::Assign).then(|| assign.op.to_string());
                Ok(self
                    .node(NodeKind::Assign, assign.span)
                    .with_assign_op(op)
                    .with_operands(vec![target, value]))
            }
            Expr::Member(member) => self.lower_member(member),
            Expr::SuperProp(super_prop) => self.lower_super_prop(super_prop),
            Expr::Call(call) => {
                let callee = match &call.callee {
                    Callee::Expr(callee) => self.lower_expr(callee)?,
                    Callee::Super(sup) => self.node(NodeKind::Super, sup.span).with_value("super"),
                    Callee::Import(import) => self.node(NodeKind::Other, import.span),
                };
                let mut operands = vec![callee];
                for arg in &call.args {
                    operands.push(self.lower_expr_or_spread(arg)?);
                }
                Ok(self.node(NodeKind::Call, call.span).with_operands(operands))
            }
            Expr::New(new) => {
                let mut operands = vec![self.lower_expr(&new.callee)?];
                for arg in new.args.iter().flatten() {
                    operands.push(self.lower_expr_or_spread(arg)?);
                }
                Ok(self.node(NodeKind::New, new.span).with_operands(operands))
            }
            Expr::OptChain(chain) => match &*chain.base {
                OptChainBase::Member(member) => self.lower_member(member),
                OptChainBase::Call(call) => {
                    let mut operands = vec![self.lower_expr(&call.callee)?];
                    for arg in &call.args {
                        operands.push(self.lower_expr_or_spread(arg)?);
                    }
                    Ok(self.node(NodeKind::Call, call.span).with_operands(operands))
                }
            },
            Expr::Array(array) => {
                let mut elements = Vec::with_capacity(array.elems.len());
                for element in array.elems.iter().flatten() {
                    elements.push(self.lower_expr_or_spread(element)?);
                }
                Ok(self.node(NodeKind::Array, array.span).with_operands(elements))
            }
            Expr::Object(object) => {
                let mut props = Vec::with_capacity(object.props.len());
                for prop in &object.props {
                    props.push(match prop {
                        PropOrSpread::Prop(prop) => self.lower_prop(prop)?,
                        PropOrSpread::Spread(spread) => {
                            let inner = self.lower_expr(&spread.expr)?;
                            self.node_at(
                                NodeKind::Spread,
                                self.span_between(spread.dot3_token.lo, spread.expr.span().hi),
                            )
                            .with_operands(vec![inner])
                        }
                    });
                }
                Ok(self.node(NodeKind::Object, object.span).with_operands(props))
            }
            Expr::Unary(unary) => {
                let arg = self.lower_expr(&unary.arg)?;
                Ok(self.node(NodeKind::Unary, unary.span).with_operands(vec![arg]))
            }
            Expr::Update(update) => {
                let arg = self.lower_expr(&update.arg)?;
                Ok(self.node(NodeKind::Unary, update.span).with_operands(vec![arg]))
            }
            Expr::Bin(bin) => {
                let left = self.lower_expr(&bin.left)?;
                let right = self.lower_expr(&bin.right)?;
                Ok(self
                    .node(NodeKind::Binary, bin.span)
                    .with_operands(vec![left, right]))
            }
            Expr::Cond(cond) => {
                let test = self.lower_expr(&cond.test)?;
                let cons = self.lower_expr(&cond.cons)?;
                let alt = self.lower_expr(&cond.alt)?;
                Ok(self
                    .node(NodeKind::Hook, cond.span)
                    .with_operands(vec![test, cons, alt]))
            }
            Expr::Seq(seq) => {
                let mut exprs = Vec::with_capacity(seq.exprs.len());
                for expr in &seq.exprs {
                    exprs.push(self.lower_expr(expr)?);
                }
                Ok(self.node(NodeKind::Comma, seq.span).with_operands(exprs))
            }
            Expr::Tpl(tpl) => {
                let mut exprs = Vec::with_capacity(tpl.exprs.len());
                for expr in &tpl.exprs {
                    exprs.push(self.lower_expr(expr)?);
                }
                Ok(self.node(NodeKind::Template, tpl.span).with_operands(exprs))
            }
            Expr::TaggedTpl(tagged) => {
                let mut operands = vec![self.lower_expr(&tagged.tag)?];
                for expr in &tagged.tpl.exprs {
                    operands.push(self.lower_expr(expr)?);
                }
                Ok(self.node(NodeKind::Template, tagged.span).with_operands(operands))
            }
            Expr::Yield(yield_expr) => {
                let arg = self.lower_opt_expr(yield_expr.arg.as_deref())?;
                Ok(self
                    .node(NodeKind::Yield, yield_expr.span)
                    .with_operands(arg.into_iter().collect()))
            }
            Expr::Await(await_expr) => {
                let arg = self.lower_expr(&await_expr.arg)?;
                Ok(self.node(NodeKind::Await, await_expr.span).with_operands(vec![arg]))
            }
            Expr::PrivateName(name) => Ok(self.private_name_node(name)),
            // Grouping and type-only wrappers are transparent
            Expr::Paren(paren) => self.lower_expr(&paren.expr),
            Expr::TsAs(ts) => self.lower_expr(&ts.expr),
            Expr::TsSatisfies(ts) => self.lower_expr(&ts.expr),
            Expr::TsNonNull(ts) => self.lower_expr(&ts.expr),
            Expr::TsTypeAssertion(ts) => self.lower_expr(&ts.expr),
            Expr::TsConstAssertion(ts) => self.lower_expr(&ts.expr),
            Expr::TsInstantiation(ts) => self.lower_expr(&ts.expr),
            // JSX, meta properties, and recovered garbage
            other => Ok(self.node(NodeKind::Other, other.span())),
        }
    }

    fn lower_expr_or_spread(&mut self, arg: &ExprOrSpread) -> Lowered {
        let expr = self.lower_expr(&arg.expr)?;
        match arg.spread {
            Some(dots) => Ok(self
                .node_at(
                    NodeKind::Spread,
                    self.span_between(dots.lo, arg.expr.span().hi),
                )
                .with_operands(vec![expr])),
            None => Ok(expr),
        }
    }

    fn lower_member(&mut self, member: &MemberExpr) -> Lowered {
        let object = self.lower_expr(&member.obj)?;
        let (kind, property) = match &member.prop {
            MemberProp::Ident(ident) => (NodeKind::Dot, self.ident_name_node(ident)),
            MemberProp::PrivateName(name) => (NodeKind::Dot, self.private_name_node(name)),
            MemberProp::Computed(computed) => (NodeKind::Index, self.lower_expr(&computed.expr)?),
        };
        Ok(self
            .node(kind, member.span)
            .with_operands(vec![object, property]))
    }

    fn lower_super_prop(&mut self, super_prop: &SuperPropExpr) -> Lowered {
        let object = self
            .node(NodeKind::Super, super_prop.obj.span)
            .with_value("super");
        let (kind, property) = match &super_prop.prop {
            SuperProp::Ident(ident) => (NodeKind::Dot, self.ident_name_node(ident)),
            SuperProp::Computed(computed) => (NodeKind::Index, self.lower_expr(&computed.expr)?),
        };
        Ok(self
            .node(kind, super_prop.span)
            .with_operands(vec![object, property]))
    }

    fn lower_assign_target(&mut self, target: &AssignTarget) -> Lowered {
        match target {
            AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) => {
                Ok(self.ident_node(&binding.id))
            }
            AssignTarget::Simple(SimpleAssignTarget::Member(member)) => self.lower_member(member),
            AssignTarget::Simple(SimpleAssignTarget::SuperProp(super_prop)) => {
                self.lower_super_prop(super_prop)
            }
            AssignTarget::Simple(SimpleAssignTarget::Paren(paren)) => self.lower_expr(&paren.expr),
            AssignTarget::Simple(other) => Ok(self.node(NodeKind::Other, other.span())),
            AssignTarget::Pat(AssignTargetPat::Array(array)) => self.lower_array_pat(array),
            AssignTarget::Pat(AssignTargetPat::Object(object)) => self.lower_object_pat(object),
            AssignTarget::Pat(other) => Ok(self.node(NodeKind::Other, other.span())),
        }
    }

    fn lower_prop(&mut self, prop: &Prop) -> Lowered {
        match prop {
            Prop::Shorthand(ident) => Ok(self.ident_node(ident)),
            Prop::KeyValue(kv) => {
                let key = self.lower_prop_name(&kv.key)?;
                let value = self.lower_expr(&kv.value)?;
                Ok(self
                    .node_at(
                        NodeKind::Property,
                        self.span_between(kv.key.span().lo, kv.value.span().hi),
                    )
                    .with_operands(vec![key, value]))
            }
            Prop::Assign(assign) => {
                let key = self.ident_node(&assign.key);
                let value = self.lower_expr(&assign.value)?;
                Ok(self
                    .node_at(
                        NodeKind::Pattern,
                        self.span_between(assign.key.span.lo, assign.value.span().hi),
                    )
                    .with_operands(vec![key, value]))
            }
            Prop::Method(method) => self.lower_function(
                &method.function,
                prop_name(&method.key),
                FunctionForm::Method,
                self.span_between(method.key.span().lo, method.function.span.hi),
            ),
            Prop::Getter(getter) => {
                let span = self.source_span(getter.span);
                let Some(body) = &getter.body else {
                    return Ok(self.node_at(NodeKind::Other, span));
                };
                let body = self.lower_block(body)?;
                Ok(self.function_node(
                    prop_name(&getter.key),
                    FunctionForm::Method,
                    span,
                    Vec::new(),
                    body,
                ))
            }
            Prop::Setter(setter) => {
                let span = self.source_span(setter.span);
                let Some(body) = &setter.body else {
                    return Ok(self.node_at(NodeKind::Other, span));
                };
                let param = self.lower_pat(&setter.param)?;
                let body = self.lower_block(body)?;
                Ok(self.function_node(
                    prop_name(&setter.key),
                    FunctionForm::Method,
                    span,
                    vec![param],
                    body,
                ))
            }
        }
    }

    fn lower_prop_name(&mut self, key: &PropName) -> Lowered {
        match key {
            PropName::Ident(ident) => Ok(self.ident_name_node(ident)),
            PropName::Computed(computed) => self.lower_expr(&computed.expr),
            other => {
                let span = self.source_span(other.span());
                let text = span.slice(self.text).unwrap_or_default().to_string();
                Ok(self.node_at(NodeKind::Literal, span).with_value(text))
            }
        }
    }

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------

    fn lower_pat(&mut self, pat: &Pat) -> Lowered {
        self.descend(pat.span())?;
        let lowered = self.lower_pat_inner(pat);
        self.depth -= 1;
        lowered
    }

    fn lower_pat_inner(&mut self, pat: &Pat) -> Lowered {
        match pat {
            Pat::Ident(binding) => Ok(self.ident_node(&binding.id)),
            Pat::Array(array) => self.lower_array_pat(array),
            Pat::Object(object) => self.lower_object_pat(object),
            Pat::Rest(rest) => {
                let arg = self.lower_pat(&rest.arg)?;
                Ok(self.node(NodeKind::Spread, rest.span).with_operands(vec![arg]))
            }
            Pat::Assign(assign) => {
                let left = self.lower_pat(&assign.left)?;
                let right = self.lower_expr(&assign.right)?;
                Ok(self
                    .node(NodeKind::Pattern, assign.span)
                    .with_operands(vec![left, right]))
            }
            Pat::Expr(expr) => self.lower_expr(expr),
            other => Ok(self.node(NodeKind::Other, other.span())),
        }
    }

    fn lower_array_pat(&mut self, array: &ArrayPat) -> Lowered {
        let mut elements = Vec::with_capacity(array.elems.len());
        for element in array.elems.iter().flatten() {
            elements.push(self.lower_pat(element)?);
        }
        Ok(self.node(NodeKind::Pattern, array.span).with_operands(elements))
    }

    fn lower_object_pat(&mut self, object: &ObjectPat) -> Lowered {
        let mut props = Vec::with_capacity(object.props.len());
        for prop in &object.props {
            props.push(match prop {
                ObjectPatProp::KeyValue(kv) => {
                    let key = self.lower_prop_name(&kv.key)?;
                    let value = self.lower_pat(&kv.value)?;
                    self.node_at(
                        NodeKind::Property,
                        self.span_between(kv.key.span().lo, kv.value.span().hi),
                    )
                    .with_operands(vec![key, value])
                }
                ObjectPatProp::Assign(assign) => {
                    let key = self.ident_node(&assign.key.id);
                    match &assign.value {
                        Some(value) => {
                            let value = self.lower_expr(value)?;
                            self.node(NodeKind::Pattern, assign.span)
                                .with_operands(vec![key, value])
                        }
                        None => key,
                    }
                }
                ObjectPatProp::Rest(rest) => {
                    let arg = self.lower_pat(&rest.arg)?;
                    self.node(NodeKind::Spread, rest.span).with_operands(vec![arg])
                }
            });
        }
        Ok(self.node(NodeKind::Pattern, object.span).with_operands(props))
    }
}

/// Static name of a property key, if it has one
fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        // Wtf8Atom to String via to_atom_lossy (borrows when possible)
        PropName::Str(str_lit) => Some(str_lit.value.to_atom_lossy().to_string()),
        PropName::Num(num) => Some(num.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::SourceKind;
    use crate::parser;
    use swc_common::{sync::Lrc, SourceMap};

    fn lower_with(src: &str, filename: &str, options: LowerOptions) -> Lowered {
        let cm: Lrc<SourceMap> = Default::default();
        let parsed =
            parser::parse_source(src, &cm, filename, SourceKind::from_path(std::path::Path::new(filename)))
                .unwrap();
        let lines = LineIndex::new(src);
        Lowerer::new(src, &lines, parsed.file.start_pos, 0, options).lower_program(&parsed.program)
    }

    fn lower(src: &str) -> SyntaxNode {
        lower_with(src, "test.js", LowerOptions::default()).unwrap()
    }

    #[test]
    fn test_function_declaration_shape() {
        let src = "function foo(a, b) { return a; }";
        let root = lower(src);
        assert_eq!(root.kind, NodeKind::Script);

        let function = root.operand(0).unwrap();
        assert_eq!(function.kind, NodeKind::Function);
        assert_eq!(function.name.as_deref(), Some("foo"));
        assert_eq!(function.form, Some(FunctionForm::Declared));
        assert_eq!(function.span.slice(src), Some(src));
        assert_eq!(function.lineno, 1);
        assert!(matches!(
            function.field(Field::Params),
            Some(crate::node::Child::Many(params)) if params.len() == 2
        ));
        assert!(function.field(Field::Body).is_some());
    }

    #[test]
    fn test_var_initializer_becomes_assignment() {
        let root = lower("var x = function () {};");
        let var = root.operand(0).unwrap();
        assert_eq!(var.kind, NodeKind::Var);

        let assign = var.operand(0).unwrap();
        assert_eq!(assign.kind, NodeKind::Assign);
        assert_eq!(assign.operand(0).unwrap().value.as_deref(), Some("x"));
        let function = assign.operand(1).unwrap();
        assert_eq!(function.kind, NodeKind::Function);
        assert_eq!(function.name, None);
        assert_eq!(function.form, Some(FunctionForm::Expressed));
    }

    #[test]
    fn test_member_assignment_shape() {
        let src = "a.b.c = function () {};";
        let root = lower(src);
        let statement = root.operand(0).unwrap();
        assert_eq!(statement.kind, NodeKind::Semicolon);

        let Some(crate::node::Child::One(assign)) = statement.field(Field::Expression) else {
            panic!("expression statement should hold its expression");
        };
        assert_eq!(assign.kind, NodeKind::Assign);
        assert_eq!(assign.assign_op, None);

        let target = assign.operand(0).unwrap();
        assert_eq!(target.kind, NodeKind::Dot);
        assert_eq!(target.operand(0).unwrap().kind, NodeKind::Dot);
        assert_eq!(target.operand(1).unwrap().value.as_deref(), Some("c"));
        assert_eq!(target.span.slice(src), Some("a.b.c"));
    }

    #[test]
    fn test_compound_assignment_records_operator() {
        let root = lower("x += 1;");
        let statement = root.operand(0).unwrap();
        let Some(crate::node::Child::One(assign)) = statement.field(Field::Expression) else {
            panic!("expression statement should hold its expression");
        };
        assert_eq!(assign.assign_op.as_deref(), Some("+="));
    }

    #[test]
    fn test_computed_member_is_index() {
        let root = lower("a['b'] = 1;");
        let statement = root.operand(0).unwrap();
        let Some(crate::node::Child::One(assign)) = statement.field(Field::Expression) else {
            panic!("expression statement should hold its expression");
        };
        let target = assign.operand(0).unwrap();
        assert_eq!(target.kind, NodeKind::Index);
        assert_eq!(target.operand(1).unwrap().value.as_deref(), Some("'b'"));
    }

    #[test]
    fn test_arrow_functions_follow_option() {
        let src = "const f = () => 1;";
        let on = lower(src);
        let arrow = on.operand(0).unwrap().operand(0).unwrap().operand(1).unwrap();
        assert_eq!(arrow.kind, NodeKind::Function);
        assert_eq!(arrow.form, Some(FunctionForm::Arrow));

        let options = LowerOptions {
            arrow_functions: false,
            ..LowerOptions::default()
        };
        let off = lower_with(src, "test.js", options).unwrap();
        let arrow = off.operand(0).unwrap().operand(0).unwrap().operand(1).unwrap();
        assert_eq!(arrow.kind, NodeKind::Arrow);
    }

    #[test]
    fn test_class_methods_follow_option() {
        let src = "class A { constructor() {} run() {} static #hidden() {} }";
        let options = LowerOptions {
            methods: true,
            ..LowerOptions::default()
        };
        let on = lower_with(src, "test.js", options).unwrap();
        let class = on.operand(0).unwrap();
        assert_eq!(class.kind, NodeKind::Class);
        assert_eq!(class.value.as_deref(), Some("A"));
        let names: Vec<Option<&str>> = class.operands().iter().map(|m| m.name.as_deref()).collect();
        assert_eq!(names, vec![Some("constructor"), Some("run"), Some("#hidden")]);
        assert!(class.operands().iter().all(|m| m.kind == NodeKind::Function));

        let off = lower(src);
        let class = off.operand(0).unwrap();
        assert!(class.operands().iter().all(|m| m.kind == NodeKind::Method));
    }

    #[test]
    fn test_object_literal_method_span() {
        let src = "var o = { go(x) { return x; } };";
        let root = lower(src);
        let object = root.operand(0).unwrap().operand(0).unwrap().operand(1).unwrap();
        assert_eq!(object.kind, NodeKind::Object);
        let method = object.operand(0).unwrap();
        assert_eq!(method.kind, NodeKind::Method);
        assert_eq!(method.name.as_deref(), Some("go"));
        assert_eq!(method.span.slice(src), Some("go(x) { return x; }"));
    }

    #[test]
    fn test_typescript_overloads_are_not_functions() {
        let src = "function f(x: string): void;\nfunction f(x: any) {}";
        let root = lower_with(src, "test.ts", LowerOptions::default()).unwrap();
        assert_eq!(root.operand(0).unwrap().kind, NodeKind::Other);
        assert_eq!(root.operand(1).unwrap().kind, NodeKind::Function);
        assert_eq!(root.operand(1).unwrap().lineno, 2);
    }

    #[test]
    fn test_exported_declarations_are_lowered() {
        let src = "export function a() {}\nexport default function b() {}\nimport x from 'y';";
        let root = lower_with(src, "test.mjs", LowerOptions::default()).unwrap();
        let names: Vec<Option<&str>> = root.operands().iter().map(|n| n.name.as_deref()).collect();
        assert_eq!(names, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn test_offset_shifts_spans() {
        let src = "function foo() {}";
        let document = format!("<script>{}</script>", src);
        let cm: Lrc<SourceMap> = Default::default();
        let parsed = parser::parse_source(src, &cm, "inline", SourceKind::JavaScript).unwrap();
        let lines = LineIndex::new(&document);
        let root = Lowerer::new(&document, &lines, parsed.file.start_pos, 8, LowerOptions::default())
            .lower_program(&parsed.program)
            .unwrap();
        let function = root.operand(0).unwrap();
        assert_eq!(function.span.slice(&document), Some(src));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("x = {}0{};", "[".repeat(64), "]".repeat(64));
        let options = LowerOptions {
            max_depth: 16,
            ..LowerOptions::default()
        };
        assert!(matches!(
            lower_with(&deep, "test.js", options),
            Err(StructuralError::TooDeep { limit: 16, line: 1 })
        ));
    }
}
