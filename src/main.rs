use log::{debug, info};
use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::path::PathBuf;
use zelda64::display_list::{find_display_lists, render};
use zelda64::message_table::Language;
use zelda64::rom::RomImage;
use zelda64::yaz0;

fn usage(program: &str) {
    println!("zelda64 - Ocarina of Time and Majora's Mask ROM explorer");
    println!();
    println!("Usage: {} <rom.z64> [--config <dir>] <command> [args]", program);
    println!("       {} yaz0 <compressed> <output>", program);
    println!();
    println!("Commands:");
    println!("  info                   build, header and file count");
    println!("  files                  file table with names");
    println!("  dlists <file>          display lists in a file (name or 0x address)");
    println!("  messages <lang>        every message of a language (jp, en, de, fr, es)");
    println!("  message <lang> <id>    one message, id in hex");
    println!();
    println!("Configuration files are searched in --config directories first,");
    println!("then in the packaged config/ directory.");
}

fn parse_hex(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s.trim_start_matches("0x"), 16).map_err(|_| format!("Invalid hex value: {}", s))
}

fn parse_message_id(s: &str) -> Result<u16, String> {
    u16::from_str_radix(s.trim_start_matches("0x"), 16).map_err(|_| format!("Invalid message id: {}", s))
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_code(s).ok_or_else(|| format!("Unknown language: {}", s))
}

fn read_file(path: &str) -> Vec<u8> {
    let mut data = Vec::new();
    let result = File::open(path).and_then(|mut f| f.read_to_end(&mut data));
    if let Err(e) = result {
        match e.kind() {
            std::io::ErrorKind::NotFound => eprintln!("Error: File not found: {}", path),
            std::io::ErrorKind::PermissionDenied => {
                eprintln!("Error: Permission denied accessing file: {}", path)
            }
            _ => eprintln!("Error: Cannot read file '{}': {}", path, e),
        }
        std::process::exit(1);
    }
    data
}

fn decompress_file(input: &str, output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_file(input);
    let out = yaz0::decompress(&data)?;
    File::create(output)?.write_all(&out)?;
    info!("wrote {:#x} bytes to {}", out.len(), output);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage(&args[0]);
        return Ok(());
    }

    if args[1] == "yaz0" {
        if args.len() < 4 {
            usage(&args[0]);
            return Ok(());
        }
        return decompress_file(&args[2], &args[3]);
    }

    let rom_path = &args[1];
    let mut rest = &args[2..];
    let mut search_paths = Vec::new();
    while rest.len() >= 2 && rest[0] == "--config" {
        search_paths.push(PathBuf::from(&rest[1]));
        rest = &rest[2..];
    }
    let Some((command, params)) = rest.split_first() else {
        usage(&args[0]);
        return Ok(());
    };

    debug!("Loading ROM: {}", rom_path);
    let mut rom = RomImage::open(read_file(rom_path), &search_paths)?;

    match (command.as_str(), params) {
        ("info", _) => println!("{}", rom),
        ("files", _) => print!("{}", rom.render_files()),
        ("dlists", [file]) => {
            let content = if file.starts_with("0x") {
                rom.decompressed_by_address(parse_hex(file)?)?
            } else {
                rom.decompressed_by_name(file)?
            };
            print!("{}", render(&find_display_lists(content.bytes())));
        }
        ("messages", [lang]) => {
            let language = parse_language(lang)?;
            let index = rom.analyze_msg_tbl()?;
            let ids: Vec<u16> = index
                .table(language)
                .map(|t| t.keys().copied().collect())
                .unwrap_or_default();
            for id in ids {
                match rom.read_message(&index, language, id) {
                    Ok(m) => println!("{:04X}: {}", id, m.plain_text().replace('\n', "\\n")),
                    Err(e) => eprintln!("{:04X}: {}", id, e),
                }
            }
        }
        ("message", [lang, id]) => {
            let language = parse_language(lang)?;
            let id = parse_message_id(id)?;
            let index = rom.analyze_msg_tbl()?;
            let message = rom.read_message(&index, language, id)?;
            if let Some(header) = &message.header {
                println!("{:?}", header);
            }
            for (i, text_box) in message.boxes().iter().enumerate() {
                println!("--- box {} ---", i);
                for line in &text_box.lines {
                    println!("{}", zelda64::text::markup(&line.fragments));
                }
            }
        }
        _ => usage(&args[0]),
    }
    Ok(())
}
