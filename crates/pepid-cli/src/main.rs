use pepid_cli::input::{command, Input};
use pepid_cli::runner::Runner;
use rayon::ThreadPoolBuilder;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("PEPID_LOG", "error,pepid=info"))
        .init();

    let matches = command().get_matches();

    let threads = matches
        .subcommand()
        .and_then(|(_, sub)| sub.get_one::<u16>("threads").copied())
        .map(usize::from)
        .unwrap_or_else(num_cpus::get);
    ThreadPoolBuilder::new().num_threads(threads).build_global()?;

    let search = Input::from_arguments(&matches)?.build()?;
    Runner::new(search).run()
}
