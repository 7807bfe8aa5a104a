// src/main.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[MAIN]Xyn>=====S===t===u===d===i===o===s======[R|$>

use anyhow::{Context, Result};
use dotenv::dotenv;
use ndarray::{s, Array2, Array3};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use ntmx::constants::{CRATE_VERSION, DEFAULT_EPISODES};
use ntmx::config::validate_section;
use ntmx::omnixtracker::setup_global_subscriber;
use ntmx::{
    AppContext, CurriculumConfig, EpisodeRunner, NTMConfig, OmniXMetry, ProblemConfig, ProblemKind, Question,
    StackedAttentionVQA, VqaConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::env::args;
use tracing::info;

fn usage(program: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Usage: {} --version | config | generate [problem] | run [episodes] [problem] | vqa [batch] [regions]",
        program
    )
}

fn problem_config(arg: Option<&String>) -> Result<ProblemConfig> {
    let mut config = ProblemConfig::from_env();
    if let Some(name) = arg {
        config.kind = name.parse::<ProblemKind>()?;
    }
    validate_section("problem", config.validate()).map_err(|e| {
        e.log();
        e
    })?;
    Ok(config)
}

fn main() -> Result<()> {
    dotenv().ok();

    let args: Vec<String> = args().collect();
    let program = args.first().map(String::as_str).unwrap_or("ntmx");
    let command = args.get(1).ok_or_else(|| usage(program))?;
    if command == "--version" {
        println!("ntmx version {}", CRATE_VERSION);
        return Ok(());
    }

    // Initialize OmniXMetry for logging and metrics
    let omnixmetry = OmniXMetry::init()?;
    setup_global_subscriber(omnixmetry.clone())?;
    info!("OmniXMetry initialized successfully.");

    let context = AppContext::default();

    match command.as_str() {
        "config" => {
            let resolved = json!({
                "context": context,
                "ntm": NTMConfig::from_env(),
                "problem": ProblemConfig::from_env(),
                "curriculum": CurriculumConfig::from_env(),
                "vqa": VqaConfig::default(),
            });
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        "generate" => {
            let config = problem_config(args.get(2))?;
            let mut generator = config.kind.build(&config, &context)?;
            let batch = generator.generate_batch();
            info!(
                problem = generator.name(),
                seq_length = batch.seq_length,
                inputs = ?batch.inputs.shape(),
                targets = ?batch.targets.shape(),
                "Generated batch"
            );
            println!("inputs (sample 0):\n{}", batch.inputs.slice(s![0, .., ..]));
            println!("targets (sample 0):\n{}", batch.targets.slice(s![0, .., ..]));
            println!("mask (sample 0):\n{}", batch.mask.row(0).mapv(u8::from));
        }
        "run" => {
            let episodes = match args.get(2) {
                Some(n) => n.parse().with_context(|| format!("Invalid episode count '{}'", n))?,
                None => DEFAULT_EPISODES,
            };
            let config = problem_config(args.get(3))?;
            let generator = config.kind.build(&config, &context)?;
            let mut runner = EpisodeRunner::from_parts(
                &NTMConfig::from_env(),
                generator,
                &CurriculumConfig::from_env(),
                &context,
                omnixmetry.clone(),
            )
            .map_err(|e| {
                e.log();
                e
            })?;
            let stats = runner.run(episodes)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        "vqa" => {
            let batch: usize = args.get(2).map(|n| n.parse()).transpose()?.unwrap_or(1);
            let regions: usize = args.get(3).map(|n| n.parse()).transpose()?.unwrap_or(16);
            let config = VqaConfig::default();
            validate_section("vqa", config.validate())?;
            let model = StackedAttentionVQA::new(&config, &context)?;

            let mut rng = StdRng::seed_from_u64(context.component_seed("vqa-input"));
            let images = Array3::random_using((batch, regions, config.image_encoding_channels), Uniform::new(0.0, 1.0), &mut rng);
            let question = Array2::random_using((batch, config.encoded_question_size), Uniform::new(-1.0, 1.0), &mut rng);
            let output = model.forward(&images, Question::Encoded(&question))?;
            info!(attention = ?output.attention.shape(), "VQA forward pass finished");
            println!("log-probabilities:\n{}", output.log_probs);
        }
        _ => return Err(usage(program)),
    }

    Ok(())
}
