use anyhow::{Context, Result};
use stack_orchestration::Stack;

pub async fn run(stack: &Stack) -> Result<()> {
    stack
        .deploy()
        .await
        .with_context(|| format!("failed to deploy stack '{}'", stack.name()))?;

    println!(
        "Stack '{}' deployed ({} services)",
        stack.name(),
        stack.components().count()
    );
    Ok(())
}
