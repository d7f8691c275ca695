//! Built-in production and property definitions.

/// Productions the engine depends on, by name.
pub const PRODUCTIONS: &[(&str, &str)] = &[
    // Math functions
    (
        "math-function",
        "<calc()> | <min()> | <max()> | <clamp()> | <round()> | <mod()> | <rem()> | <sin()> | \
         <cos()> | <tan()> | <asin()> | <acos()> | <atan()> | <atan2()> | <pow()> | <sqrt()> | \
         <hypot()> | <log()> | <exp()> | <abs()> | <sign()> | <progress()> | <calc-mix()> | \
         <calc-interpolate()> | <random()>",
    ),
    ("calc()", "calc( <calc-sum> )"),
    ("calc-sum", "<calc-product> [ [ '+' | '-' ] <calc-product> ]*"),
    ("calc-product", "<calc-value> [ [ '*' | '/' ] <calc-value> ]*"),
    (
        "calc-value",
        "<number-token> | <dimension-token> | <percentage-token> | <calc-keyword> | \
         ( <calc-sum> ) | <math-function>",
    ),
    ("calc-keyword", "e | pi | infinity | -infinity | nan"),
    ("min()", "min( <calc-sum># )"),
    ("max()", "max( <calc-sum># )"),
    (
        "clamp()",
        "clamp( [ <calc-sum> | none ] , <calc-sum> , [ <calc-sum> | none ] )",
    ),
    (
        "round()",
        "round( <rounding-strategy>? , <calc-sum> , <calc-sum>? )",
    ),
    ("rounding-strategy", "nearest | up | down | to-zero"),
    ("mod()", "mod( <calc-sum> , <calc-sum> )"),
    ("rem()", "rem( <calc-sum> , <calc-sum> )"),
    ("sin()", "sin( <calc-sum> )"),
    ("cos()", "cos( <calc-sum> )"),
    ("tan()", "tan( <calc-sum> )"),
    ("asin()", "asin( <calc-sum> )"),
    ("acos()", "acos( <calc-sum> )"),
    ("atan()", "atan( <calc-sum> )"),
    ("atan2()", "atan2( <calc-sum> , <calc-sum> )"),
    ("pow()", "pow( <calc-sum> , <calc-sum> )"),
    ("sqrt()", "sqrt( <calc-sum> )"),
    ("hypot()", "hypot( <calc-sum># )"),
    ("log()", "log( <calc-sum> , <calc-sum>? )"),
    ("exp()", "exp( <calc-sum> )"),
    ("abs()", "abs( <calc-sum> )"),
    ("sign()", "sign( <calc-sum> )"),
    (
        "progress()",
        "progress( <calc-sum> , <calc-sum> , <calc-sum> )",
    ),
    (
        "calc-mix()",
        "calc-mix( <calc-sum> , <calc-sum> , <calc-sum> )",
    ),
    (
        "calc-interpolate()",
        "calc-interpolate( <calc-sum> , [ <calc-sum> ':' <calc-sum> ]# )",
    ),
    (
        "random()",
        "random( <random-caching-options>? , <calc-sum> , <calc-sum> , [ by <calc-sum> ]? )",
    ),
    ("random-caching-options", "<dashed-ident> || per-element"),
    // Colors
    (
        "color",
        "<hex-color> | <rgb()> | <rgba()> | <hsl()> | <hsla()> | <hwb()> | <named-color> | \
         <system-color> | currentcolor | transparent",
    ),
    (
        "rgb()",
        "rgb( [ <number> | <percentage> | none ]{3} [ / [ <alpha-value> | none ] ]? ) | \
         rgb( <percentage>#{3} , <alpha-value>? ) | rgb( <number>#{3} , <alpha-value>? )",
    ),
    (
        "rgba()",
        "rgba( [ <number> | <percentage> | none ]{3} [ / [ <alpha-value> | none ] ]? ) | \
         rgba( <percentage>#{3} , <alpha-value>? ) | rgba( <number>#{3} , <alpha-value>? )",
    ),
    (
        "hsl()",
        "hsl( [ <hue> | none ] [ <percentage> | <number> | none ] [ <percentage> | <number> | none ] \
         [ / [ <alpha-value> | none ] ]? ) | \
         hsl( <hue> , <percentage> , <percentage> , <alpha-value>? )",
    ),
    (
        "hsla()",
        "hsla( [ <hue> | none ] [ <percentage> | <number> | none ] [ <percentage> | <number> | none ] \
         [ / [ <alpha-value> | none ] ]? ) | \
         hsla( <hue> , <percentage> , <percentage> , <alpha-value>? )",
    ),
    (
        "hwb()",
        "hwb( [ <hue> | none ] [ <percentage> | <number> | none ] [ <percentage> | <number> | none ] \
         [ / [ <alpha-value> | none ] ]? )",
    ),
    ("alpha-value", "<number> | <percentage>"),
    ("hue", "<number> | <angle>"),
    // Miscellaneous
    ("ratio", "<number [0,∞]> [ / <number [0,∞]> ]?"),
    (
        "boolean-expr",
        "not <boolean-expr-group> | \
         <boolean-expr-group> [ [ and <boolean-expr-group> ]* | [ or <boolean-expr-group> ]* ]",
    ),
    (
        "boolean-expr-group",
        "<test> | ( <boolean-expr[ <test> ]> ) | <general-enclosed>",
    ),
];

/// A few common properties: name, definition, initial value.
pub const PROPERTIES: &[(&str, &str, &str)] = &[
    ("color", "<color>", "canvastext"),
    ("opacity", "<alpha-value>", "1"),
    (
        "width",
        "auto | <length-percentage [0,∞]> | min-content | max-content | \
         fit-content( <length-percentage [0,∞]> )",
        "auto",
    ),
    ("aspect-ratio", "auto || <ratio>", "auto"),
    ("z-index", "auto | <integer>", "auto"),
    ("transition-duration", "<time [0s,∞]>#", "0s"),
    (
        "rotate",
        "none | <angle> | [ [ x | y | z | <number>{3} ] && <angle> ]",
        "none",
    ),
];
