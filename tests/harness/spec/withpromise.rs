use std::time::Duration;

use specrig::{FixtureContext, TestHandle};

pub async fn spec(t: TestHandle, fixture: FixtureContext) -> anyhow::Result<()> {
    tokio::time::sleep(Duration::from_millis(200)).await;
    t.equal(
        fixture.get_str("fixtureKey"),
        Some("withpromise"),
        "withpromise spec fixture was correctly assigned",
    );
    Ok(())
}
