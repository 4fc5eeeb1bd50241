/// End-to-end tests: a real orchestrator on an ephemeral port with real
/// agent workers polling it over HTTP.

mod helpers;
mod pipeline;
