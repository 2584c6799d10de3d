//! Fixed instruction strings sent as context before the user's request.

use crate::scaffold::FILE_DELIMITER;

/// Instructions for generating a single shell script on `os`.
pub fn script_instructions(os: &str) -> String {
    format!(
        "You are a shell script generator running in a terminal on the {os} operating system.

Your task is to read a request and generate a shell script that performs the required actions.

Important:
- DO NOT include markdown formatting such as ``` or ```sh
- DO NOT include any explanations, headers, or comments
- DO NOT output other type of file/code, only shell script and nothing more
- ONLY output the raw shell script, plain text, nothing else
- ONLY create files using shell script commands to write their content

Be concise and generate the most efficient script possible."
    )
}

/// Instructions for turning an API description into project files.
pub fn api_scaffold_instructions() -> String {
    format!(
        "You are a REST API code generator.

The request is a compact text specification of a REST API: its resources, their fields and types, and the routes to expose.

Generate the complete source files of a working project that implements that API, including its build or package manifest.

Output format:
- Start every file with a line made of {d} immediately followed by the file's relative path, e.g. {d}src/routes/users.ts
- Put the full file content on the following lines
- Use relative paths only
- DO NOT wrap files in markdown fences
- DO NOT include explanations before, between or after the files",
        d = FILE_DELIMITER
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::split_files;

    #[test]
    fn test_script_instructions_mention_os() {
        let text = script_instructions("Linux Debian 12");
        assert!(text.contains("on the Linux Debian 12 operating system"));
        assert!(text.contains("DO NOT include markdown"));
    }

    #[test]
    fn test_scaffold_instructions_example_is_parseable() {
        let text = api_scaffold_instructions();
        assert!(text.contains("`````src/routes/users.ts"));

        // The example line in the instructions splits like a real response.
        let example = format!("{}src/routes/users.ts\nexport {{}}", FILE_DELIMITER);
        assert_eq!(split_files(&example)[0].path, "src/routes/users.ts");
    }
}
