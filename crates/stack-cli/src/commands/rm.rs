use anyhow::{Context, Result};
use stack_orchestration::Stack;

pub async fn run(stack: &Stack) -> Result<()> {
    stack
        .teardown()
        .await
        .with_context(|| format!("failed to tear down stack '{}'", stack.name()))?;

    println!("Stack '{}' removed", stack.name());
    Ok(())
}
