fn main() -> std::io::Result<()> {
    insightboard_lib::run()
}
