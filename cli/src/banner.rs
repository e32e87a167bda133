// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use colored::Colorize;

const BANNER: &str = r"
    ____  __    _      __       _    ___       _ __
   / __ \/ /_  (_)____/ /_     | |  / (_)___ _(_) /
  / /_/ / __ \/ / ___/ __ \____| | / / / __ `/ / /
 / ____/ / / / (__  ) / / /____/ |/ / / /_/ / / /
/_/   /_/ /_/_/____/_/ /_/     |___/_/\__, /_/_/
                                     /____/
";

pub fn print_banner(bind: &str, backend: &str) {
    println!("{}", BANNER.blue());
    println!("  [+] VERSION:    {}", env!("CARGO_PKG_VERSION"));
    println!("  [+] LISTENING:  {}", bind);
    println!("  [+] STORAGE:    {}", backend);
    println!("{}", "=".repeat(70));
    println!("  [!] STATUS:     Enterprise Defensive Simulation Mode");
    println!("  [!] LOGGING:    Append-only interaction audit active");
    println!("{}\n", "=".repeat(70));
}
