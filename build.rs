// Migrations and seed data are embedded into the binary at compile time,
// so edits to either must trigger a rebuild.
fn main() {
    println!("cargo:rerun-if-changed=migrations");
    println!("cargo:rerun-if-changed=src/data/Seed.json");
}
