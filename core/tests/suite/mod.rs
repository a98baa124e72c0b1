// Aggregates all former standalone integration tests as modules.
mod connectivity;
mod reentry;
