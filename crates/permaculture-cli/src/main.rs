mod command;
mod data;
mod render;
mod schema;
mod util;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    command::run()
}
