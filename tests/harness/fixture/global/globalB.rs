use serde_json::{Value, json};
use specrig::TestHandle;

pub fn fixture(t: &TestHandle) -> Value {
    t.pass("Tests are running in global fixture context");
    t.fail("Testing failures");

    json!({ "globalBKey": "globalBValue" })
}
