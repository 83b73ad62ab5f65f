// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use expretau_engine::{
    CompileContext, DataFormat, DataParser, EvalContext, Registry, RtData, RtExpr, SchemaParser,
    SchemaRoot, Value, parse,
};

const VERSION: &str = "1.0";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl From<Format> for DataFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => DataFormat::Json,
            Format::Yaml => DataFormat::Yaml,
        }
    }
}

/// Evaluate typed expressions, optionally against a JSON or YAML record.
#[derive(Parser, Debug)]
#[command(name = "expretau", version = VERSION)]
struct Args {
    /// schema describing the record's layout
    #[arg(long)]
    schema: Option<PathBuf>,
    /// the record itself, inline
    #[arg(long, conflicts_with = "data_file")]
    data: Option<String>,
    /// read the record from a file
    #[arg(long)]
    data_file: Option<PathBuf>,
    /// format of inline documents and files without a known extension
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    format: Format,
    #[arg(long, default_value = ">>> ")]
    prompt: String,
    /// print the compiled expression before its value
    #[arg(long)]
    compiled: bool,
    /// evaluate this and exit instead of starting the console
    expression: Option<String>,
}

struct Session {
    root: Option<Arc<SchemaRoot>>,
    data: Option<RtData>,
    show_compiled: bool,
}

fn format_of(path: &Path, fallback: Format) -> DataFormat {
    DataFormat::from_extension(path).unwrap_or_else(|_| fallback.into())
}

impl Session {
    fn open(args: &Args) -> anyhow::Result<Session> {
        let root = match args.schema {
            Some(ref path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading schema {}", path.display()))?;
                let parser = SchemaParser::new(format_of(path, args.format));
                let root = parser
                    .parse(&text)
                    .with_context(|| format!("compiling schema {}", path.display()))?;
                debug!(slots = root.max_index(), "loaded schema");
                Some(Arc::new(root))
            }
            None => None,
        };

        let document = match (&args.data, &args.data_file) {
            (Some(text), _) => Some((text.clone(), DataFormat::from(args.format))),
            (None, Some(path)) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading record {}", path.display()))?;
                Some((text, format_of(path, args.format)))
            }
            (None, None) => None,
        };

        let data = match (document, &root) {
            (Some((text, format)), Some(root)) => {
                let parser = DataParser::new(format, Arc::clone(root));
                Some(parser.parse(&text).context("reading record")?)
            }
            (Some(_), None) => bail!("a record needs a --schema"),
            (None, _) => None,
        };

        Ok(Session {
            root,
            data,
            show_compiled: args.compiled,
        })
    }

    fn compile(&self, line: &str) -> expretau_engine::Result<RtExpr> {
        let ctx = self
            .root
            .as_ref()
            .map(|root| root.schema() as &dyn CompileContext);
        parse(line)?.compile(ctx, Registry::global())
    }

    fn eval(&self, line: &str) -> expretau_engine::Result<Value> {
        let rt = self.compile(line)?;
        if self.show_compiled {
            println!("{rt}");
        }
        rt.eval(self.data.as_ref().map(|d| d as &dyn EvalContext))
    }

    fn console(&self, prompt: &str) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("{prompt}");
            io::stdout().flush()?;
            let line = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            match self.eval(line) {
                Ok(value) => println!("{value}"),
                Err(err) => println!("error: {err}"),
            }
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let session = Session::open(&args)?;

    match args.expression {
        Some(ref expression) => {
            let value = session.eval(expression)?;
            println!("{value}");
            Ok(())
        }
        None => session.console(&args.prompt),
    }
}
