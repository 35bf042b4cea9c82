//! Post-order traversal of function bodies with in-place rewriting.
//!
//! Children are visited before their parent, left to right, and functions in
//! module order. The visitor also receives the enclosing function's name and
//! the module itself, so it may add imports or types while walking. Each body
//! is detached from the module for the duration of its walk and reattached
//! afterwards, also when the visitor fails.

use crate::expr::Expr;
use crate::module::Module;

/// Callback for [`walk_module_mut`].
pub trait VisitMut {
    type Error;

    fn visit_expr(
        &mut self,
        expr: &mut Expr,
        function: &str,
        module: &mut Module,
    ) -> Result<(), Self::Error>;
}

/// Walk one expression tree in post-order.
pub fn walk_expr_mut<V: VisitMut>(
    visitor: &mut V,
    expr: &mut Expr,
    function: &str,
    module: &mut Module,
) -> Result<(), V::Error> {
    for child in expr.children_mut() {
        walk_expr_mut(visitor, child, function, module)?;
    }
    visitor.visit_expr(expr, function, module)
}

/// Walk every function body in the module.
///
/// Functions added by the visitor during the walk are not visited.
pub fn walk_module_mut<V: VisitMut>(visitor: &mut V, module: &mut Module) -> Result<(), V::Error> {
    let count = module.functions.len();
    for index in 0..count {
        let name = module.functions[index].name.clone();
        let mut body = std::mem::replace(&mut module.functions[index].body, Expr::Nop);
        let result = walk_expr_mut(visitor, &mut body, &name, module);
        module.functions[index].body = body;
        result?;
    }
    Ok(())
}
