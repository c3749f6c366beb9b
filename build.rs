fn main() {
    // Emits ESP-IDF cfg/env forwarding when building for espidf;
    // harmless no-op for host-target builds.
    embuild::espidf::sysenv::output();
}
