use super::{
    ArrayLiteral, AssignExpression, BlockStatement, CallExpression, Expression, ExpressionStatement,
    ForExpression, HashLiteral, IfExpression, IndexExpression, InfixExpression, LetStatement,
    PrefixExpression, Program, ReturnStatement, Statement,
};

/// Rewrites every expression slot of the tree, children first, finally
/// replacing the expression itself with whatever the modifier returns for
/// it. The traversal is typed per slot, so a rewriter can never smuggle a
/// statement into an expression position. Used by macro expansion and by
/// the `unquote` rewrite inside `quote`.
pub fn modify_program<F>(mut program: Program, modifier: &F) -> Program
where
    F: Fn(Expression) -> Expression,
{
    program.statements = program
        .statements
        .into_iter()
        .map(|statement| modify_statement(statement, modifier))
        .collect();
    program
}

pub fn modify_statement<F>(statement: Statement, modifier: &F) -> Statement
where
    F: Fn(Expression) -> Expression,
{
    match statement {
        Statement::Let(LetStatement { token, name, value }) => Statement::Let(LetStatement {
            token,
            name,
            value: modify_expression(value, modifier),
        }),
        Statement::Return(ReturnStatement { token, value }) => Statement::Return(ReturnStatement {
            token,
            value: value.map(|value| modify_expression(value, modifier)),
        }),
        Statement::Expression(ExpressionStatement { token, expression }) => {
            Statement::Expression(ExpressionStatement {
                token,
                expression: modify_expression(expression, modifier),
            })
        }
    }
}

pub fn modify_block<F>(mut block: BlockStatement, modifier: &F) -> BlockStatement
where
    F: Fn(Expression) -> Expression,
{
    block.statements = block
        .statements
        .into_iter()
        .map(|statement| modify_statement(statement, modifier))
        .collect();
    block
}

pub fn modify_expression<F>(expression: Expression, modifier: &F) -> Expression
where
    F: Fn(Expression) -> Expression,
{
    let expression = match expression {
        Expression::Prefix(PrefixExpression {
            token,
            operator,
            right,
        }) => Expression::Prefix(PrefixExpression {
            token,
            operator,
            right: Box::new(modify_expression(*right, modifier)),
        }),
        Expression::Infix(InfixExpression {
            token,
            left,
            operator,
            right,
        }) => Expression::Infix(InfixExpression {
            token,
            left: Box::new(modify_expression(*left, modifier)),
            operator,
            right: Box::new(modify_expression(*right, modifier)),
        }),
        Expression::Assign(AssignExpression { token, left, value }) => {
            Expression::Assign(AssignExpression {
                token,
                left: Box::new(modify_expression(*left, modifier)),
                value: Box::new(modify_expression(*value, modifier)),
            })
        }
        Expression::Index(IndexExpression { token, left, index }) => {
            Expression::Index(IndexExpression {
                token,
                left: Box::new(modify_expression(*left, modifier)),
                index: Box::new(modify_expression(*index, modifier)),
            })
        }
        Expression::If(IfExpression {
            token,
            condition,
            consequence,
            alternative,
        }) => Expression::If(IfExpression {
            token,
            condition: Box::new(modify_expression(*condition, modifier)),
            consequence: modify_block(consequence, modifier),
            alternative: alternative.map(|block| modify_block(block, modifier)),
        }),
        Expression::For(ForExpression {
            token,
            init,
            condition,
            post,
            body,
        }) => Expression::For(ForExpression {
            token,
            init: Box::new(modify_statement(*init, modifier)),
            condition: Box::new(modify_expression(*condition, modifier)),
            post: Box::new(modify_expression(*post, modifier)),
            body: modify_block(body, modifier),
        }),
        Expression::Function(mut function) => {
            function.body = modify_block(function.body, modifier);
            Expression::Function(function)
        }
        Expression::ArrayLiteral(ArrayLiteral { token, elements }) => {
            Expression::ArrayLiteral(ArrayLiteral {
                token,
                elements: elements
                    .into_iter()
                    .map(|element| modify_expression(element, modifier))
                    .collect(),
            })
        }
        Expression::HashLiteral(HashLiteral { token, pairs }) => {
            Expression::HashLiteral(HashLiteral {
                token,
                pairs: pairs
                    .into_iter()
                    .map(|(key, value)| {
                        (
                            modify_expression(key, modifier),
                            modify_expression(value, modifier),
                        )
                    })
                    .collect(),
            })
        }
        Expression::Call(CallExpression {
            token,
            function,
            arguments,
        }) => Expression::Call(CallExpression {
            token,
            function: Box::new(modify_expression(*function, modifier)),
            arguments: arguments
                .into_iter()
                .map(|argument| modify_expression(argument, modifier))
                .collect(),
        }),
        other => other,
    };

    modifier(expression)
}
