use std::io::{self, Read};

use vcard21::{EventConsumer, VCardParser, VCardProperty};

struct Printer;

impl EventConsumer for Printer {
    fn on_vcard_started(&mut self) {
        println!("--- vcard ---");
    }

    fn on_property_created(&mut self, property: &VCardProperty) {
        println!("{property} = {:?}", property.value);
    }

    fn on_vcard_ended(&mut self) {
        println!("--- end ---");
    }
}

fn main() {
    env_logger::init();

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .expect("failed to read vCard input from stdin");

    let mut printer = Printer;
    let mut parser = VCardParser::lenient();
    parser.add_consumer(&mut printer);
    parser.parse(input.as_bytes()).expect("failed to parse vCard stream");
}
