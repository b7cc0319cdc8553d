use anyhow::Result;
use stack_orchestration::{Error, RetryPolicy, Stack};

pub async fn run(stack: &Stack) -> Result<()> {
    // A status report is a snapshot, not a wait: query exactly once.
    let policy = RetryPolicy::single_attempt();

    match stack.check_deployed_with(true, &policy).await {
        Ok(()) => {
            println!(
                "Stack '{}' is deployed ({} services)",
                stack.name(),
                stack.components().count()
            );
            Ok(())
        }
        Err(Error::NotDeployed { output, .. }) => {
            println!("Stack '{}' is not (fully) deployed", stack.name());
            if !output.is_empty() {
                println!("Currently running:\n{output}");
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
