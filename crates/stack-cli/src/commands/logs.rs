use anyhow::{Context, Result};
use stack_orchestration::Stack;

pub async fn run(stack: &Stack, component: &str, follow: bool) -> Result<()> {
    stack
        .logs(component, follow)
        .await
        .with_context(|| format!("failed to fetch logs for component '{component}'"))
}
