//! Document Engine Test Suite
//!
//! End-to-end tests through the public `docpath` API.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Semantic Invariants**
//!   Path resolution, parent symmetry, append and delete-by-index laws.
//!
//! - **Tier 2: Property-Based**
//!   Flatten/unflatten round-trip and resolution determinism over random trees.
//!
//! - **Tier 3: Query and View**
//!   Filtering, sorting, detail views, exports.
//!
//! - **Tier 4: Persistence**
//!   JSON file store, config, import.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test document_engine
//!
//! # Only property tests
//! cargo test --test document_engine roundtrip
//! ```

// Test utilities
mod test_utils;

// Tier 1: Semantic Invariants
mod mutation_invariants;
mod path_invariants;

// Tier 2: Property-Based
mod flatten_roundtrip;

// Tier 3: Query and View
mod query_tests;

// Tier 4: Persistence
mod file_store_tests;
