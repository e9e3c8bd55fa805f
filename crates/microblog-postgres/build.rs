#![forbid(unsafe_code)]

/// `embed_migrations!` is a procedural macro and cannot tell cargo that it
/// depends on the files inside the migrations directory, so adding or editing
/// a migration would not trigger a rebuild on its own.
///
/// Emitting `rerun-if-changed` here makes the crate rebuild whenever the
/// migrations directory changes.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
