use eyre::Result;

pub fn run() -> Result<()> {
    yusholib::show_version();
    Ok(())
}
