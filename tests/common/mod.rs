#![allow(dead_code)]

use laravel_uml::Config;
use laravel_uml::config::StyleConfig;
use std::fs;
use std::path::Path;

pub const LARAVEL_COMPOSER_JSON: &str = r#"{
    "autoload": {
        "psr-4": {
            "App\\": "app/",
            "Database\\Factories\\": "database/factories/"
        }
    }
}"#;

/// Helper: a temporary Laravel project with a composer.json and PHP
/// files at the given relative paths.
pub struct LaravelWorkspace {
    dir: tempfile::TempDir,
}

impl LaravelWorkspace {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::write(dir.path().join("composer.json"), LARAVEL_COMPOSER_JSON)
            .expect("failed to write composer.json");
        let ws = LaravelWorkspace { dir };
        for (rel_path, content) in files {
            ws.write(rel_path, content);
        }
        ws
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative_path: &str, content: &str) {
        let full = self.dir.path().join(relative_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write PHP file");
    }
}

/// Default configuration without style directives, so documents
/// contain only nodes and edges.
pub fn plain_config() -> Config {
    Config {
        style: StyleConfig::default(),
        ..Config::default()
    }
}

/// Render a workspace and split the document into lines.
pub fn render_lines(ws: &LaravelWorkspace, config: &Config) -> Vec<String> {
    laravel_uml::render_nomnoml(ws.root(), config)
        .expect("render should succeed")
        .lines()
        .map(str::to_string)
        .collect()
}

pub const USER_MODEL: &str = r#"<?php

namespace App\Models;

use Illuminate\Database\Eloquent\Model;

class User extends Model
{
    protected $fillable = ['name', 'email'];

    public function posts()
    {
        return $this->hasMany(Post::class);
    }
}
"#;

pub const POST_MODEL: &str = r#"<?php

namespace App\Models;

use App\Models\User;
use Illuminate\Database\Eloquent\Model;

class Post extends Model
{
    public $title;

    public function user()
    {
        return $this->belongsTo(User::class);
    }
}
"#;
