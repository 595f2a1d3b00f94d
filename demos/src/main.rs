//! `gpu-examples`: run one example by name, or all of them in turn.

use std::process::ExitCode;

use clap::Parser;
use gpu_examples_app::{
    AppError, CompilerChoice, ExampleArgs, ExampleRunner, GpuContext, find_content_root,
};
use gpu_examples_shaders::{NagaCompiler, ResolverConfig, ShaderCompiler, ShaderResolver, SlangcCompiler};

fn main() -> ExitCode {
    let args = ExampleArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if matches!(e, AppError::Logger(_)) {
                eprintln!("{e}");
            } else {
                log::error!("{e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: &ExampleArgs) -> Result<(), AppError> {
    gpu_examples_app::init_logging()?;
    gpu_examples_core::init();
    gpu_examples_shaders::init();
    gpu_examples_app::init();
    log::info!("GPU Examples Demos v{}", gpu_examples_demos::VERSION);

    let registry = gpu_examples_demos::registry();
    if args.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let entry = match &args.example {
        Some(name) => Some(
            *registry
                .find(name)
                .ok_or_else(|| AppError::UnknownExample(name.clone()))?,
        ),
        None => None,
    };

    let format = args.shader_format(GpuContext::SUPPORTED_FORMATS)?;
    let content_root = find_content_root(
        args.content_dir.as_deref(),
        &gpu_examples_demos::default_content_root(),
    )?;
    let config = ResolverConfig::new(&content_root).with_format(format);
    let compiler: Box<dyn ShaderCompiler> = match args.compiler {
        CompilerChoice::Naga => Box::new(NagaCompiler::new()),
        CompilerChoice::Slangc => Box::new(SlangcCompiler::new(&args.slangc_config())?),
    };
    let resolver = ShaderResolver::new(config, compiler);
    let mut runner = ExampleRunner::new(args.runner_settings(), resolver, content_root)?;

    match entry {
        Some(entry) => runner.run(&entry),
        None => {
            let failures = runner.run_all(&registry)?;
            if failures > 0 {
                log::warn!("{failures} of {} examples failed", registry.len());
            }
            Ok(())
        }
    }
}
