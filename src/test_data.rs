#[cfg(test)]
pub const POST_DATA_MD: &str = "<!--
[DATE]: # (2024-02-12 22:54:00.000)
[AUTHOR]: # (thiago)
[CATEGORY]: # (Python)
[TAGS]: # (python ai)
[FEATURED]: # (true)
-->

# What I learned after 20+ years of software development
How to be a great software engineer?

Someone asked me this question today and I didn’t have an answer.

<!-- more -->

## Non technical

### Have a honest image of yourself

You finished university and learned a lot. You solved many hard problems.
It's common to think you are awesome and the smartest person in the planet.
";
