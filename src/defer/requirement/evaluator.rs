//! Requirement evaluator
//!
//! Turns a requirement tree into one future. AND waits for every operand,
//! OR settles on the first operand that succeeds. All operands of a node
//! start together; there is no timeout and no memoization.

use super::ast::{Condition, Operator, Requirement};
use super::parser::parse;
use crate::defer::registry::StrategyRegistry;
use crate::kit::error::{DeferError, RequirementError};
use crate::kit::strategy::{ComponentHandle, StrategyContext};
use futures::future::{self, BoxFuture, FutureExt};

/// Parse `requirement` and wait until it is satisfied for `component`
pub async fn await_requirements(
    requirement: &str,
    component: &ComponentHandle,
    registry: &StrategyRegistry,
) -> Result<(), DeferError> {
    let tree = parse(requirement)?;
    log::debug!(
        "Component {} waiting on '{}' ({})",
        component.id,
        requirement,
        tree
    );
    evaluate(&tree, component, registry).await?;
    Ok(())
}

/// Evaluate a requirement tree
pub fn evaluate<'a>(
    requirement: &'a Requirement,
    component: &'a ComponentHandle,
    registry: &'a StrategyRegistry,
) -> BoxFuture<'a, Result<(), RequirementError>> {
    async move {
        match requirement {
            Requirement::Condition(condition) => {
                evaluate_condition(condition, component, registry).await
            }
            Requirement::Expression {
                operator: Operator::And,
                operands,
            } => {
                let pending = operands
                    .iter()
                    .map(|operand| evaluate(operand, component, registry));
                future::try_join_all(pending).await.map(|_| ())
            }
            Requirement::Expression {
                operator: Operator::Or,
                operands,
            } => {
                if operands.is_empty() {
                    return Err(RequirementError::NoneSatisfied { count: 0 });
                }
                let pending = operands
                    .iter()
                    .map(|operand| evaluate(operand, component, registry));
                // Losing operands are dropped with the remainder
                match future::select_ok(pending).await {
                    Ok(((), _rest)) => Ok(()),
                    Err(_) => Err(RequirementError::NoneSatisfied {
                        count: operands.len(),
                    }),
                }
            }
        }
    }
    .boxed()
}

async fn evaluate_condition(
    condition: &Condition,
    component: &ComponentHandle,
    registry: &StrategyRegistry,
) -> Result<(), RequirementError> {
    let Some(strategy) = registry.get(&condition.name).await else {
        log::warn!(
            "Unknown strategy '{}' for component {}; it will never be satisfied",
            condition.name,
            component.id
        );
        return future::pending().await;
    };

    let ctx = StrategyContext {
        component,
        argument: condition.argument.as_deref(),
    };

    strategy
        .wait(&ctx)
        .await
        .map_err(|e| RequirementError::Rejected {
            strategy: condition.name.clone(),
            message: e.to_string(),
        })
}
