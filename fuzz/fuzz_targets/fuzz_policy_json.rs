#![no_main]
use libfuzzer_sys::fuzz_target;
use pbac::{Policy, PolicyEngine, Request};

// Arbitrary policy documents must never panic the engine
fuzz_target!(|data: &[u8]| {
    let json = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };
    let policies = match Policy::list_from_json(json) {
        Ok(p) => p,
        Err(_) => return,
    };

    for policy in &policies {
        let _ = policy.validate();
    }

    let request = Request::new("read:file", "alice", "docs/a.txt", "2024-01-01 10:00");
    let _ = PolicyEngine::new().evaluate(&policies, &request);
});
