//! Descriptors of the plugins compiled into the binary.
//!
//! Only the option schemas live here; the data-plane behavior of each
//! plugin is provided by the pipeline runtime.

use crate::plugin::descriptor::{OptionSpec, OptionType, PluginDescriptor, PluginKind};

pub fn descriptors() -> Vec<PluginDescriptor> {
    vec![
        heartbeat(),
        cpu(),
        mem(),
        dummy(),
        tail(),
        grep(),
        modify(),
        record_modifier(),
        stdout(),
        null(),
        file(),
        http(),
    ]
}

fn heartbeat() -> PluginDescriptor {
    PluginDescriptor::new(
        "heartbeat",
        PluginKind::Custom,
        "Periodically report agent liveness",
    )
    .option(
        OptionSpec::new("interval", OptionType::Time)
            .describe("Time between two heartbeats.")
            .default_value("60s"),
    )
    .option(
        OptionSpec::new("add_label", OptionType::Slist)
            .describe("Label attached to every heartbeat, as 'key value'.")
            .multiple(),
    )
}

fn cpu() -> PluginDescriptor {
    PluginDescriptor::new("cpu", PluginKind::Input, "CPU Usage")
        .option(
            OptionSpec::new("pid", OptionType::Integer)
                .describe("Specify the ID (PID) of a running process in the system. By default the plugin monitors the whole system but if this option is set, it will only monitor the given process ID."),
        )
        .option(
            OptionSpec::new("interval_sec", OptionType::Integer)
                .describe("Set the collector interval")
                .default_value("1"),
        )
        .option(
            OptionSpec::new("interval_nsec", OptionType::Integer)
                .describe("Set the collector interval (nanoseconds)")
                .default_value("0"),
        )
}

fn mem() -> PluginDescriptor {
    PluginDescriptor::new("mem", PluginKind::Input, "Memory Usage")
        .option(
            OptionSpec::new("interval_sec", OptionType::Integer)
                .describe("Set the collector interval")
                .default_value("1"),
        )
        .option(
            OptionSpec::new("interval_nsec", OptionType::Integer)
                .describe("Set the collector interval (nanoseconds)")
                .default_value("0"),
        )
        .option(
            OptionSpec::new("pid", OptionType::Integer)
                .describe("Set the PID of the process to measure"),
        )
}

fn dummy() -> PluginDescriptor {
    PluginDescriptor::new("dummy", PluginKind::Input, "Generate dummy data")
        .option(
            OptionSpec::new("dummy", OptionType::String)
                .describe("Set the dummy record to generate")
                .default_value("{\"message\":\"dummy\"}"),
        )
        .option(
            OptionSpec::new("rate", OptionType::Integer)
                .describe("Set the number of records per second")
                .default_value("1"),
        )
        .option(
            OptionSpec::new("samples", OptionType::Integer)
                .describe("Set the number of samples to generate, 0 means no limit")
                .default_value("0"),
        )
        .option(
            OptionSpec::new("fixed_timestamp", OptionType::Boolean)
                .describe("Use the same timestamp on every record")
                .default_value("off"),
        )
}

fn tail() -> PluginDescriptor {
    PluginDescriptor::new("tail", PluginKind::Input, "Tail files")
        .option(
            OptionSpec::new("path", OptionType::Clist)
                .describe("pattern specifying log files or multiple ones through the use of common wildcards. Allows multiple patterns separated by commas."),
        )
        .option(
            OptionSpec::new("exclude_path", OptionType::Clist)
                .describe("Set one or multiple shell patterns separated by commas to exclude files matching certain criteria."),
        )
        .option(
            OptionSpec::new("refresh_interval", OptionType::Time)
                .describe("interval to refresh the list of watched files expressed in seconds.")
                .default_value("60"),
        )
        .option(
            OptionSpec::new("buffer_chunk_size", OptionType::Size)
                .describe("set the initial buffer size to read data from files. This value is used too to increase buffer size.")
                .default_value("32k")
                .category("buffering"),
        )
        .option(
            OptionSpec::new("buffer_max_size", OptionType::Size)
                .describe("set the limit of the buffer size per monitored file.")
                .default_value("32k")
                .category("buffering"),
        )
        .option(
            OptionSpec::new("parser", OptionType::String)
                .describe("specify the parser name to process an unstructured message."),
        )
        .option(
            OptionSpec::new("db", OptionType::String)
                .describe("set a database file to keep track of monitored files and offsets.")
                .category("database"),
        )
        .option(
            OptionSpec::new("db.sync", OptionType::String)
                .describe("set a database sync method. values: extra, full, normal and off.")
                .default_value("normal")
                .category("database"),
        )
}

fn grep() -> PluginDescriptor {
    PluginDescriptor::new("grep", PluginKind::Filter, "grep events by specified field values")
        .option(
            OptionSpec::new("regex", OptionType::Slist)
                .describe("Keep records in which the content of KEY matches the regular expression.")
                .multiple(),
        )
        .option(
            OptionSpec::new("exclude", OptionType::Slist)
                .describe("Exclude records in which the content of KEY matches the regular expression.")
                .multiple(),
        )
        .option(
            OptionSpec::new("logical_op", OptionType::String)
                .describe("Specify whether to use logical conjunction or disjunction. legacy, AND and OR are allowed.")
                .default_value("legacy"),
        )
}

fn modify() -> PluginDescriptor {
    PluginDescriptor::new("modify", PluginKind::Filter, "modify records by applying rules")
        .option(
            OptionSpec::new("set", OptionType::Slist)
                .describe("Add a key/value pair, overwriting any existing key.")
                .multiple(),
        )
        .option(
            OptionSpec::new("add", OptionType::Slist)
                .describe("Add a key/value pair if the key does not exist.")
                .multiple(),
        )
        .option(
            OptionSpec::new("remove", OptionType::String)
                .describe("Remove a key/value pair with the given key.")
                .multiple(),
        )
        .option(
            OptionSpec::new("rename", OptionType::Slist)
                .describe("Rename a key if it exists and the target name is not taken.")
                .multiple(),
        )
        .option(
            OptionSpec::new("condition", OptionType::Slist)
                .describe("Only apply the rules when every condition holds.")
                .multiple()
                .category("conditions"),
        )
}

fn record_modifier() -> PluginDescriptor {
    PluginDescriptor::new("record_modifier", PluginKind::Filter, "modify record")
        .option(
            OptionSpec::new("record", OptionType::Slist)
                .describe("Append fields. This parameter needs key and value pair.")
                .multiple(),
        )
        .option(
            OptionSpec::new("remove_key", OptionType::String)
                .describe("If the key is matched, that field is removed.")
                .multiple(),
        )
        .option(
            OptionSpec::new("allowlist_key", OptionType::String)
                .describe("If the key is not matched, that field is removed.")
                .multiple(),
        )
        .option(
            OptionSpec::new("uuid_key", OptionType::String)
                .describe("If set, the plugin generates uuid per record."),
        )
}

fn stdout() -> PluginDescriptor {
    PluginDescriptor::new("stdout", PluginKind::Output, "Prints events to STDOUT")
        .option(
            OptionSpec::new("format", OptionType::String)
                .describe("Specifies the data format to be printed. Supported formats are msgpack, json, json_lines and json_stream.")
                .default_value("msgpack"),
        )
        .option(
            OptionSpec::new("json_date_key", OptionType::String)
                .describe("Specifies the name of the date field in output.")
                .default_value("date"),
        )
        .option(
            OptionSpec::new("json_date_format", OptionType::String)
                .describe("Specifies the format of the date. Supported formats are double, iso8601 and epoch.")
                .default_value("double"),
        )
}

fn null() -> PluginDescriptor {
    PluginDescriptor::new("null", PluginKind::Output, "Throws away events")
}

fn file() -> PluginDescriptor {
    PluginDescriptor::new("file", PluginKind::Output, "Generate log file")
        .option(
            OptionSpec::new("path", OptionType::String)
                .describe("Absolute path to store the files. This parameter is optional"),
        )
        .option(
            OptionSpec::new("file", OptionType::String)
                .describe("Name of file to store the events"),
        )
        .option(
            OptionSpec::new("format", OptionType::String)
                .describe("Specify the output data format, the available options are: plain (json), csv, ltsv and template. If no value is set the outgoing data is formatted using the tag and the record in json")
                .default_value("out_file"),
        )
        .option(
            OptionSpec::new("mkdir", OptionType::Boolean)
                .describe("Recursively create output directory if it does not exist. Permissions set to 0755.")
                .default_value("false"),
        )
}

fn http() -> PluginDescriptor {
    PluginDescriptor::new("http", PluginKind::Output, "HTTP Output")
        .option(
            OptionSpec::new("uri", OptionType::String)
                .describe("Specify an optional HTTP URI for the target web server, e.g: /something")
                .default_value("/"),
        )
        .option(
            OptionSpec::new("format", OptionType::String)
                .describe("Set desired payload format: json, json_stream, json_lines, gelf or msgpack")
                .default_value("msgpack"),
        )
        .option(
            OptionSpec::new("header", OptionType::Slist)
                .describe("Add a HTTP header key/value pair. Multiple headers can be set")
                .multiple(),
        )
        .option(
            OptionSpec::new("header_", OptionType::String)
                .describe("Add a HTTP header whose name follows the prefix")
                .prefix(),
        )
        .option(
            OptionSpec::new("host", OptionType::String)
                .describe("Target host")
                .default_value("127.0.0.1")
                .category("networking"),
        )
        .option(
            OptionSpec::new("port", OptionType::Integer)
                .describe("Target TCP port")
                .default_value("80")
                .category("networking"),
        )
        .option(
            OptionSpec::new("tls", OptionType::Boolean)
                .describe("Enable or disable TLS/SSL support")
                .default_value("off")
                .category("network_tls"),
        )
        .option(
            OptionSpec::new("tls.verify", OptionType::Boolean)
                .describe("Force certificate validation")
                .default_value("on")
                .category("network_tls"),
        )
}
