use std::{fs::File, io::Read, path::Path};

use json::{self, JsonValue};

use super::Episode;
use crate::simulation::*;
use crate::Error;

macro_rules! get_json {
    ($func:ident, $json:ident $(, $key:literal)+) => {
        $json$([$key])+
            .$func()
            .ok_or(concat!("Couldn't find numeric ", $(concat!("/", $key)),+))?
    };
}

pub fn parse_episode<P: AsRef<Path>>(episode_file_path: P) -> Result<Episode, Error> {
    let episode_json = read_json(episode_file_path.as_ref())?;
    episode_from_json(&episode_json).map_err(Error::Config)
}

pub fn parse_from_string(content: &str) -> Result<Episode, Error> {
    let episode_json = json::parse(content).map_err(|e| Error::Config(format!("Json error: {e}")))?;
    episode_from_json(&episode_json).map_err(Error::Config)
}

fn read_json(file_path: &Path) -> Result<JsonValue, Error> {
    let mut file_content = String::new();
    let mut file = File::open(file_path).map_err(|e| {
        Error::Config(format!(
            "Error while opening file {}: {e}",
            file_path.display()
        ))
    })?;

    file.read_to_string(&mut file_content)
        .map_err(|e| Error::Config(format!("Failed to read file: {e}")))?;
    json::parse(&file_content).map_err(|e| Error::Config(format!("Json error: {e}")))
}

fn episode_from_json(json: &JsonValue) -> Result<Episode, String> {
    if !json.is_object() {
        return Err("Episode has to be a json object".to_owned());
    }
    Ok(Episode {
        seed: get_json!(as_u64, json, "Seed"),
        lander: parse_lander(json)?,
        gravity: parse_gravity(&json["Gravity"], parse_body(json)?)?,
        collision_checker: parse_landing(&json["Landing"])?,
    })
}

fn parse_lander(json: &JsonValue) -> Result<Lander, String> {
    let lander = Lander {
        x: get_json!(as_f64, json, "Lander", "X"),
        y: get_json!(as_f64, json, "Lander", "Y"),
        vx: get_json!(as_f64, json, "Lander", "HSpeed"),
        vy: get_json!(as_f64, json, "Lander", "VSpeed"),
        rotation: get_json!(as_f64, json, "Lander", "Rotation"),
        engine_power: get_json!(as_f64, json, "Lander", "EnginePower"),
        mass: get_json!(as_f64, json, "Lander", "Mass"),
    };
    lander.validate().map_err(|e| e.to_string())?;
    Ok(lander)
}

fn parse_body(json: &JsonValue) -> Result<Body, String> {
    let body_json = &json["Body"];
    if body_json.is_null() {
        return Ok(Body::default());
    }
    if !body_json.is_object() {
        return Err("Body has to be a json object".to_owned());
    }
    let body = Body {
        mass: get_json!(as_f64, json, "Body", "Mass"),
        radius: get_json!(as_f64, json, "Body", "Radius"),
    };
    if body.mass > 0. && body.radius > 0. {
        Ok(body)
    } else {
        Err("Body/Mass and Body/Radius have to be positive".to_owned())
    }
}

fn parse_gravity(gravity_json: &JsonValue, body: Body) -> Result<Gravity, String> {
    if gravity_json.is_null() {
        return Ok(Gravity::default());
    }
    if let Some(g) = gravity_json.as_f64() {
        return Ok(Gravity::Constant(g));
    }
    match gravity_json.as_str() {
        Some("Body") => Ok(Gravity::Body(body)),
        _ => Err("Gravity has to be a number or \"Body\"".to_owned()),
    }
}

fn parse_landing(landing_json: &JsonValue) -> Result<CollisionChecker, String> {
    let mut checker = CollisionChecker::default();
    if landing_json.is_null() {
        return Ok(checker);
    }
    if !landing_json.is_object() {
        return Err("Landing has to be a json object".to_owned());
    }

    macro_rules! limit {
        ($key:literal, $builder:ident) => {
            let value_json = &landing_json[$key];
            if !value_json.is_null() {
                let value = value_json
                    .as_f64()
                    .ok_or(concat!("Landing/", $key, " has to be a number"))?;
                if !(value > 0.) {
                    return Err(concat!("Landing/", $key, " has to be positive").to_owned());
                }
                checker = checker.$builder(value);
            }
        };
    }

    limit!("MaxHSpeed", with_max_horizontal_speed);
    limit!("MaxVSpeed", with_max_vertical_speed);
    limit!("MaxRotation", with_max_rotation);
    Ok(checker)
}
