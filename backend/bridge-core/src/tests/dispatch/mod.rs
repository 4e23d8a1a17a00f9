mod method;
mod readiness;
mod signal;
