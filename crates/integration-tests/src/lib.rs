//! Shared behavioral suites for bump-board live under `tests/`.
