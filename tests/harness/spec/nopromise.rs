use serde_json::json;
use specrig::{Completion, FixtureContext, TestHandle};

pub fn spec(t: TestHandle, fixture: FixtureContext) -> Completion {
    t.equal(fixture.get("fixtureKey"), json!("nopromise"), "nopromise spec fixture was correctly assigned");
    t.equal(fixture.get("globalBKey"), json!("globalBValue"), "nopromise spec was assigned globalB fixture");
    Completion::done()
}
