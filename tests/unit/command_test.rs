//! Unit tests for chat command parsing

use imagegen_bot::backend::traits::Model;
use imagegen_bot::bot::command::{parse_image_args, Command};
use imagegen_bot::config::GenerationConfig;
use imagegen_bot::error::AppError;

fn defaults() -> GenerationConfig {
    GenerationConfig::default()
}

#[test]
fn test_prompt_only_uses_defaults() {
    let request = parse_image_args("a beautiful sunset over mountains", &defaults()).unwrap();

    assert_eq!(request.prompt, "a beautiful sunset over mountains");
    assert_eq!(request.width, 1024);
    assert_eq!(request.height, 1024);
    assert_eq!(request.model, Model::Flux);
}

#[test]
fn test_width_and_height() {
    let request = parse_image_args("512 512 a cute puppy", &defaults()).unwrap();

    assert_eq!(request.width, 512);
    assert_eq!(request.height, 512);
    assert_eq!(request.model, Model::Flux);
    assert_eq!(request.prompt, "a cute puppy");
}

#[test]
fn test_width_height_and_model() {
    let request = parse_image_args("1024 768 Stable-Diffusion a futuristic cityscape", &defaults()).unwrap();

    assert_eq!(request.width, 1024);
    assert_eq!(request.height, 768);
    assert_eq!(request.model, Model::StableDiffusion);
    assert_eq!(request.prompt, "a futuristic cityscape");
}

#[test]
fn test_model_without_height_stays_in_prompt() {
    let request = parse_image_args("800 glide a forest", &defaults()).unwrap();

    assert_eq!(request.width, 800);
    assert_eq!(request.height, 1024);
    assert_eq!(request.model, Model::Flux);
    assert_eq!(request.prompt, "glide a forest");
}

#[test]
fn test_leading_model_is_part_of_prompt() {
    let request = parse_image_args("dall-e a robot", &defaults()).unwrap();

    assert_eq!(request.model, Model::Flux);
    assert_eq!(request.prompt, "dall-e a robot");
}

#[test]
fn test_numbers_only_leaves_no_prompt() {
    let result = parse_image_args("512 512 flux", &defaults());
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn test_whitespace_is_collapsed() {
    let request = parse_image_args("  a   cute\tcat  ", &defaults()).unwrap();
    assert_eq!(request.prompt, "a cute cat");
}

#[test]
fn test_command_aliases() {
    for text in ["/img a cat", "/image a cat", "/generate a cat"] {
        assert_eq!(Command::parse(text), Some(Command::Image("a cat".to_string())));
    }
    assert_eq!(Command::parse("/help"), Some(Command::Help));
    assert_eq!(Command::parse("/admin"), Some(Command::Admin));
    assert_eq!(Command::parse("/img"), Some(Command::Image(String::new())));
}
