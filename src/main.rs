fn main() {
    duti_drop::game::run();
}
